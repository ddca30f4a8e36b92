//! Risk classification, floor bucketing, and loss estimation

mod rates;

pub use rates::RateTable;

use serde::{Deserialize, Serialize};

/// Flood risk category derived from a zone code
///
/// Variant order is severity order: `NoRisk < Low < Medium < High`. The
/// spatial join's de-duplication relies on this ordering to keep the
/// highest-risk candidate when multiple zone sources intersect one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    NoRisk,
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// All categories in severity order
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::NoRisk,
        RiskCategory::Low,
        RiskCategory::Medium,
        RiskCategory::High,
    ];

    /// Classify a zone code into a risk category.
    ///
    /// Total function: 1 -> Low, 2 -> Medium, 3 -> High, anything else
    /// (including no zone code at all) -> NoRisk.
    pub fn from_zone_code(code: Option<i32>) -> Self {
        match code {
            Some(1) => RiskCategory::Low,
            Some(2) => RiskCategory::Medium,
            Some(3) => RiskCategory::High,
            _ => RiskCategory::NoRisk,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::NoRisk => "No Risk",
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
        }
    }
}

/// Building occupancy category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OccupancyCategory {
    Residential,
    Commercial,
    Industrial,
}

impl OccupancyCategory {
    /// Parse an occupancy label from the portfolio.
    ///
    /// Accepts the source portfolio's Indonesian labels and their English
    /// equivalents, case-insensitively. Unrecognized labels are `None` and
    /// propagate as an undefined rate downstream.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "residensial" | "residential" => Some(OccupancyCategory::Residential),
            "komersial" | "commercial" => Some(OccupancyCategory::Commercial),
            "industrial" => Some(OccupancyCategory::Industrial),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OccupancyCategory::Residential => "Residential",
            OccupancyCategory::Commercial => "Commercial",
            OccupancyCategory::Industrial => "Industrial",
        }
    }
}

/// Floor-count bucket used by the rate table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FloorBucket {
    SingleFloor,
    MultiFloor,
}

impl FloorBucket {
    /// Bucket a normalized floor count.
    ///
    /// Zero floors is invalid input coerced to ground floor, as are negative
    /// counts. Fractional counts are truncated toward zero before bucketing.
    /// An undefined count stays undefined.
    pub fn from_count(count: Option<f64>) -> Option<Self> {
        let count = count?;
        if !count.is_finite() {
            return None;
        }
        let floors = count.trunc().max(1.0);
        if floors == 1.0 {
            Some(FloorBucket::SingleFloor)
        } else {
            Some(FloorBucket::MultiFloor)
        }
    }
}

/// Estimated maximum loss: TSI x rate, defined only when both operands are.
///
/// An undefined result is never coerced to zero so that aggregation can keep
/// lookup misses distinguishable from genuine zero-loss records.
pub fn estimated_loss(tsi: Option<f64>, rate: Option<f64>) -> Option<f64> {
    match (tsi, rate) {
        (Some(tsi), Some(rate)) => Some(tsi * rate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_is_total() {
        assert_eq!(RiskCategory::from_zone_code(Some(1)), RiskCategory::Low);
        assert_eq!(RiskCategory::from_zone_code(Some(2)), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_zone_code(Some(3)), RiskCategory::High);
        assert_eq!(RiskCategory::from_zone_code(Some(0)), RiskCategory::NoRisk);
        assert_eq!(RiskCategory::from_zone_code(Some(7)), RiskCategory::NoRisk);
        assert_eq!(RiskCategory::from_zone_code(Some(-1)), RiskCategory::NoRisk);
        assert_eq!(RiskCategory::from_zone_code(None), RiskCategory::NoRisk);
    }

    #[test]
    fn test_severity_order() {
        assert!(RiskCategory::NoRisk < RiskCategory::Low);
        assert!(RiskCategory::Low < RiskCategory::Medium);
        assert!(RiskCategory::Medium < RiskCategory::High);
    }

    #[test]
    fn test_occupancy_labels() {
        assert_eq!(
            OccupancyCategory::from_label("Residensial"),
            Some(OccupancyCategory::Residential)
        );
        assert_eq!(
            OccupancyCategory::from_label(" residential "),
            Some(OccupancyCategory::Residential)
        );
        assert_eq!(
            OccupancyCategory::from_label("KOMERSIAL"),
            Some(OccupancyCategory::Commercial)
        );
        assert_eq!(
            OccupancyCategory::from_label("Industrial"),
            Some(OccupancyCategory::Industrial)
        );
        assert_eq!(OccupancyCategory::from_label("Warehouse"), None);
    }

    #[test]
    fn test_floor_buckets() {
        // zero floors coerced to ground floor
        assert_eq!(FloorBucket::from_count(Some(0.0)), FloorBucket::from_count(Some(1.0)));
        assert_eq!(FloorBucket::from_count(Some(1.0)), Some(FloorBucket::SingleFloor));
        assert_eq!(FloorBucket::from_count(Some(1.9)), Some(FloorBucket::SingleFloor));
        assert_eq!(FloorBucket::from_count(Some(2.0)), Some(FloorBucket::MultiFloor));
        assert_eq!(FloorBucket::from_count(Some(10.0)), Some(FloorBucket::MultiFloor));
        assert_eq!(FloorBucket::from_count(Some(-3.0)), Some(FloorBucket::SingleFloor));
        assert_eq!(FloorBucket::from_count(None), None);
        assert_eq!(FloorBucket::from_count(Some(f64::NAN)), None);
    }

    #[test]
    fn test_estimated_loss_propagates_undefined() {
        assert_eq!(estimated_loss(Some(1000.0), Some(0.3)), Some(300.0));
        assert_eq!(estimated_loss(Some(1000.0), Some(0.0)), Some(0.0));
        assert_eq!(estimated_loss(None, Some(0.3)), None);
        assert_eq!(estimated_loss(Some(1000.0), None), None);
        assert_eq!(estimated_loss(None, None), None);
    }
}
