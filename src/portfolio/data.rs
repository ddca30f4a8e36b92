//! Policy record types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rating::OccupancyCategory;

/// One policy from the ingested portfolio, with normalized fields
///
/// Created on ingestion and progressively enriched through the pipeline; the
/// raw source cells are preserved verbatim so the enriched export can carry
/// every original column. Records that reach this type always have valid
/// coordinates; rows failing coordinate normalization go to the diagnostic
/// subset instead.
#[derive(Debug, Clone)]
pub struct PolicyRecord {
    /// 1-based line number of this row in the source file (header is line 1)
    pub row: usize,

    /// Original cells in header order, padded to header width
    pub raw: Vec<String>,

    pub latitude: f64,
    pub longitude: f64,

    /// Total Sum Insured; undefined when monetary normalization failed
    pub tsi: Option<f64>,

    /// Occupancy label exactly as it appeared in the source (trimmed)
    pub occupancy_label: String,

    /// Parsed occupancy; `None` for unrecognized labels
    pub occupancy: Option<OccupancyCategory>,

    /// Floor count; undefined when non-numeric
    pub floor_count: Option<f64>,

    /// Underwriting year; undefined when non-numeric
    pub underwriting_year: Option<i32>,

    /// Expiry date; `None` when the column is absent or unparseable
    pub expiry: Option<NaiveDate>,
}

/// Which slice of the portfolio enters the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioFilter {
    /// Every row
    #[default]
    Full,
    /// Only rows whose expiry date is strictly after the cutoff
    InforceOnly,
}
