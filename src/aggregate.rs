//! Aggregate summaries over the enriched record set
//!
//! All aggregates are derived from the frozen enriched snapshot, never stored.
//! Ordering is deterministic: ascending year, then occupancy, then risk
//! severity. Undefined TSI or estimated loss is excluded from sums but the
//! record still counts; a record with an undefined grouping dimension is
//! excluded from groupings over that dimension only.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::engine::EnrichedRecord;
use crate::rating::{OccupancyCategory, RiskCategory};

/// Count / sum-TSI / sum-loss for one group
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupMetrics {
    pub policy_count: u64,
    pub total_tsi: f64,
    pub total_loss: f64,
}

impl GroupMetrics {
    fn absorb(&mut self, row: &EnrichedRecord) {
        self.policy_count += 1;
        if let Some(tsi) = row.record.tsi {
            self.total_tsi += tsi;
        }
        if let Some(loss) = row.estimated_loss {
            self.total_loss += loss;
        }
    }
}

/// A combined-key pivot: one row per underwriting year, one cell per column
///
/// Columns are the distinct dimension values observed in the data; cells for
/// combinations that never occur are zero-filled, not omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable<C> {
    pub columns: Vec<C>,
    pub rows: Vec<(i32, Vec<GroupMetrics>)>,
}

/// Summary per underwriting year, ascending.
pub fn summary_by_year(records: &[EnrichedRecord]) -> Vec<(i32, GroupMetrics)> {
    let mut groups: BTreeMap<i32, GroupMetrics> = BTreeMap::new();
    for row in records {
        if let Some(year) = row.record.underwriting_year {
            groups.entry(year).or_default().absorb(row);
        }
    }
    groups.into_iter().collect()
}

/// Summary per occupancy category.
pub fn summary_by_occupancy(records: &[EnrichedRecord]) -> Vec<(OccupancyCategory, GroupMetrics)> {
    let mut groups: BTreeMap<OccupancyCategory, GroupMetrics> = BTreeMap::new();
    for row in records {
        if let Some(occupancy) = row.record.occupancy {
            groups.entry(occupancy).or_default().absorb(row);
        }
    }
    groups.into_iter().collect()
}

/// Summary per risk category, in severity order.
pub fn summary_by_risk(records: &[EnrichedRecord]) -> Vec<(RiskCategory, GroupMetrics)> {
    let mut groups: BTreeMap<RiskCategory, GroupMetrics> = BTreeMap::new();
    for row in records {
        groups.entry(row.risk).or_default().absorb(row);
    }
    groups.into_iter().collect()
}

/// Record count per risk category, all four categories reported.
///
/// An empty High band is itself review-relevant, so zero rows are kept here
/// unlike in the observed-value pivots.
pub fn risk_distribution(records: &[EnrichedRecord]) -> Vec<(RiskCategory, u64)> {
    RiskCategory::ALL
        .iter()
        .map(|&category| {
            let count = records.iter().filter(|row| row.risk == category).count() as u64;
            (category, count)
        })
        .collect()
}

/// Year x risk-category pivot.
pub fn pivot_year_by_risk(records: &[EnrichedRecord]) -> PivotTable<RiskCategory> {
    pivot(records, |row| Some(row.risk))
}

/// Year x (occupancy x risk-category) pivot.
pub fn pivot_year_by_occupancy_risk(
    records: &[EnrichedRecord],
) -> PivotTable<(OccupancyCategory, RiskCategory)> {
    pivot(records, |row| row.record.occupancy.map(|o| (o, row.risk)))
}

fn pivot<C, F>(records: &[EnrichedRecord], column_of: F) -> PivotTable<C>
where
    C: Ord + Copy,
    F: Fn(&EnrichedRecord) -> Option<C>,
{
    let mut columns: BTreeSet<C> = BTreeSet::new();
    let mut years: BTreeSet<i32> = BTreeSet::new();
    let mut cells: BTreeMap<(i32, C), GroupMetrics> = BTreeMap::new();

    for row in records {
        let (Some(year), Some(column)) = (row.record.underwriting_year, column_of(row)) else {
            continue;
        };
        columns.insert(column);
        years.insert(year);
        cells.entry((year, column)).or_default().absorb(row);
    }

    let columns: Vec<C> = columns.into_iter().collect();
    let rows = years
        .into_iter()
        .map(|year| {
            let metrics = columns
                .iter()
                .map(|&column| cells.get(&(year, column)).cloned().unwrap_or_default())
                .collect();
            (year, metrics)
        })
        .collect();

    PivotTable { columns, rows }
}

/// Every aggregate view of one run, bundled for reporting
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub by_year: Vec<(i32, GroupMetrics)>,
    pub by_occupancy: Vec<(OccupancyCategory, GroupMetrics)>,
    pub by_risk: Vec<(RiskCategory, GroupMetrics)>,
    pub risk_distribution: Vec<(RiskCategory, u64)>,
    pub year_by_risk: PivotTable<RiskCategory>,
    pub year_by_occupancy_risk: PivotTable<(OccupancyCategory, RiskCategory)>,
}

pub fn build_report(records: &[EnrichedRecord]) -> AggregateReport {
    AggregateReport {
        by_year: summary_by_year(records),
        by_occupancy: summary_by_occupancy(records),
        by_risk: summary_by_risk(records),
        risk_distribution: risk_distribution(records),
        year_by_risk: pivot_year_by_risk(records),
        year_by_occupancy_risk: pivot_year_by_occupancy_risk(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::PolicyRecord;

    fn record(
        year: Option<i32>,
        occupancy: Option<OccupancyCategory>,
        risk: RiskCategory,
        tsi: Option<f64>,
        loss: Option<f64>,
    ) -> EnrichedRecord {
        EnrichedRecord {
            record: PolicyRecord {
                row: 2,
                raw: Vec::new(),
                latitude: -6.2,
                longitude: 106.8,
                tsi,
                occupancy_label: occupancy.map(|o| o.as_str().to_string()).unwrap_or_default(),
                occupancy,
                floor_count: Some(1.0),
                underwriting_year: year,
                expiry: None,
            },
            zone_code: None,
            risk,
            rate: loss.map(|_| 0.1),
            estimated_loss: loss,
        }
    }

    #[test]
    fn test_year_summary() {
        let records = vec![
            record(Some(2024), Some(OccupancyCategory::Residential), RiskCategory::Low, Some(100.0), Some(10.0)),
            record(Some(2024), Some(OccupancyCategory::Commercial), RiskCategory::Medium, Some(200.0), Some(40.0)),
            record(Some(2023), Some(OccupancyCategory::Residential), RiskCategory::Low, Some(50.0), Some(5.0)),
        ];

        let by_year = summary_by_year(&records);
        assert_eq!(by_year.len(), 2);
        // ascending year order
        assert_eq!(by_year[0].0, 2023);
        assert_eq!(by_year[1].0, 2024);
        assert_eq!(by_year[1].1.policy_count, 2);
        assert_eq!(by_year[1].1.total_tsi, 300.0);
        assert_eq!(by_year[1].1.total_loss, 50.0);
    }

    #[test]
    fn test_undefined_values_counted_but_not_summed() {
        let records = vec![
            record(Some(2024), Some(OccupancyCategory::Residential), RiskCategory::Low, Some(100.0), Some(10.0)),
            // lookup miss: loss undefined, TSI undefined
            record(Some(2024), Some(OccupancyCategory::Residential), RiskCategory::Low, None, None),
        ];

        let by_year = summary_by_year(&records);
        assert_eq!(by_year[0].1.policy_count, 2);
        assert_eq!(by_year[0].1.total_tsi, 100.0);
        assert_eq!(by_year[0].1.total_loss, 10.0);
    }

    #[test]
    fn test_undefined_dimension_excluded_from_that_grouping_only() {
        let records = vec![
            record(None, Some(OccupancyCategory::Industrial), RiskCategory::High, Some(100.0), Some(40.0)),
        ];

        assert!(summary_by_year(&records).is_empty());
        let by_occupancy = summary_by_occupancy(&records);
        assert_eq!(by_occupancy.len(), 1);
        assert_eq!(by_occupancy[0].1.policy_count, 1);
    }

    #[test]
    fn test_risk_distribution_reports_all_categories() {
        let records = vec![
            record(Some(2024), None, RiskCategory::Medium, Some(100.0), Some(30.0)),
        ];

        let distribution = risk_distribution(&records);
        assert_eq!(distribution.len(), 4);
        assert_eq!(distribution[0], (RiskCategory::NoRisk, 0));
        assert_eq!(distribution[2], (RiskCategory::Medium, 1));
        assert_eq!(distribution[3], (RiskCategory::High, 0));
    }

    #[test]
    fn test_pivot_zero_fills_missing_combinations() {
        let records = vec![
            record(Some(2023), None, RiskCategory::Low, Some(100.0), Some(15.0)),
            record(Some(2024), None, RiskCategory::High, Some(200.0), Some(100.0)),
        ];

        let pivot = pivot_year_by_risk(&records);
        assert_eq!(pivot.columns, vec![RiskCategory::Low, RiskCategory::High]);
        assert_eq!(pivot.rows.len(), 2);

        // 2023 has no High records: zero-filled, not omitted
        let (year, cells) = &pivot.rows[0];
        assert_eq!(*year, 2023);
        assert_eq!(cells[0].policy_count, 1);
        assert_eq!(cells[1], GroupMetrics::default());
    }

    #[test]
    fn test_occupancy_risk_pivot_columns_sorted() {
        let records = vec![
            record(Some(2024), Some(OccupancyCategory::Commercial), RiskCategory::High, Some(1.0), Some(0.5)),
            record(Some(2024), Some(OccupancyCategory::Residential), RiskCategory::Low, Some(1.0), Some(0.1)),
            record(Some(2024), Some(OccupancyCategory::Residential), RiskCategory::High, Some(1.0), Some(0.5)),
        ];

        let pivot = pivot_year_by_occupancy_risk(&records);
        assert_eq!(
            pivot.columns,
            vec![
                (OccupancyCategory::Residential, RiskCategory::Low),
                (OccupancyCategory::Residential, RiskCategory::High),
                (OccupancyCategory::Commercial, RiskCategory::High),
            ]
        );
    }
}
