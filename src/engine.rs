//! Pipeline orchestration
//!
//! `ExposureEngine` drives the data flow: normalized records -> spatial join
//! -> risk classification -> rate resolution -> loss estimation. The result
//! is a frozen enriched snapshot plus run diagnostics; aggregation reads the
//! snapshot without mutating it.

use std::collections::HashMap;

use log::info;

use crate::portfolio::{PolicyRecord, Portfolio};
use crate::rating::{estimated_loss, FloorBucket, RateTable, RiskCategory};
use crate::spatial::{assign_zone_codes, PointKey};
use crate::zones::{SourceSkip, ZoneLoad};

/// A policy record enriched with the pipeline's derived fields
#[derive(Debug, Clone)]
pub struct EnrichedRecord {
    pub record: PolicyRecord,
    /// Zone code from the spatial join; `None` when no polygon matched
    pub zone_code: Option<i32>,
    pub risk: RiskCategory,
    /// Resolved loss rate; `None` on a rate-table lookup miss
    pub rate: Option<f64>,
    /// Probable maximum loss (TSI x rate); `None` when either is undefined
    pub estimated_loss: Option<f64>,
}

/// Counters and per-source reports for one run
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RunDiagnostics {
    pub rows_read: usize,
    pub rows_dropped_by_filter: usize,
    pub invalid_coordinate_rows: usize,
    pub rows_rated: usize,
    pub rows_without_zone: usize,
    pub rows_without_rate: usize,
    pub sources_joined: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_sources: Vec<SourceSkip>,
}

/// Output of a pipeline run
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Source header, for the enriched and invalid-row exports
    pub header: Vec<String>,
    pub enriched: Vec<EnrichedRecord>,
    /// Rows excluded for invalid coordinates, cells verbatim
    pub invalid_rows: Vec<Vec<String>>,
    pub diagnostics: RunDiagnostics,
}

/// Batch rating engine holding the immutable rate table
#[derive(Debug, Clone, Default)]
pub struct ExposureEngine {
    rates: RateTable,
}

impl ExposureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Run the full pipeline over an ingested portfolio and loaded zones.
    pub fn run(&self, portfolio: Portfolio, zones: &ZoneLoad) -> RunResult {
        let points: Vec<(f64, f64)> = portfolio
            .records
            .iter()
            .map(|record| (record.longitude, record.latitude))
            .collect();
        let assignments: HashMap<PointKey, Option<i32>> =
            assign_zone_codes(&points, &zones.sources);

        let mut diagnostics = RunDiagnostics {
            rows_read: portfolio.stats.rows_read,
            rows_dropped_by_filter: portfolio.stats.rows_dropped_by_filter,
            invalid_coordinate_rows: portfolio.stats.invalid_coordinate_rows,
            sources_joined: zones.sources.len(),
            skipped_sources: zones.skipped.clone(),
            ..Default::default()
        };

        let enriched: Vec<EnrichedRecord> = portfolio
            .records
            .into_iter()
            .map(|record| {
                let key = PointKey::new(record.longitude, record.latitude);
                let zone_code = assignments.get(&key).copied().flatten();
                let risk = RiskCategory::from_zone_code(zone_code);
                let rate = self.rates.resolve(
                    risk,
                    record.occupancy,
                    FloorBucket::from_count(record.floor_count),
                );
                let loss = estimated_loss(record.tsi, rate);

                if zone_code.is_none() {
                    diagnostics.rows_without_zone += 1;
                }
                if rate.is_none() {
                    diagnostics.rows_without_rate += 1;
                }
                EnrichedRecord {
                    record,
                    zone_code,
                    risk,
                    rate,
                    estimated_loss: loss,
                }
            })
            .collect();

        diagnostics.rows_rated = enriched.len();
        info!(
            "rated {} record(s) against {} zone source(s) ({} skipped)",
            diagnostics.rows_rated,
            diagnostics.sources_joined,
            diagnostics.skipped_sources.len()
        );

        RunResult {
            header: portfolio.header,
            enriched,
            invalid_rows: portfolio.invalid_rows,
            diagnostics,
        }
    }
}
