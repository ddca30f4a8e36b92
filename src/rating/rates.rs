//! Fixed underwriting rate table (building occupancy schedule)

use std::collections::HashMap;

use super::{FloorBucket, OccupancyCategory, RiskCategory};

/// Loss-rate table keyed by (risk category, occupancy, floor bucket)
///
/// A fixed, process-wide constant: built once via `Default` and held read-only
/// by the engine. Lookup is an explicit total function returning `Option<f64>`
/// so that "no matching entry" stays distinguishable from the legitimate
/// zero-rate NoRisk match.
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: HashMap<(RiskCategory, OccupancyCategory, FloorBucket), f64>,
}

impl Default for RateTable {
    fn default() -> Self {
        use FloorBucket::{MultiFloor, SingleFloor};
        use OccupancyCategory::{Commercial, Industrial, Residential};
        use RiskCategory::{High, Low, Medium};

        let mut rates = HashMap::new();
        let mut insert = |risk, occupancy, single: f64, multi: f64| {
            rates.insert((risk, occupancy, SingleFloor), single);
            rates.insert((risk, occupancy, MultiFloor), multi);
        };

        insert(Low, Residential, 0.15, 0.10);
        insert(Low, Commercial, 0.20, 0.15);
        insert(Low, Industrial, 0.10, 0.08);

        insert(Medium, Residential, 0.30, 0.20);
        insert(Medium, Commercial, 0.35, 0.25);
        insert(Medium, Industrial, 0.20, 0.15);

        insert(High, Residential, 0.50, 0.35);
        insert(High, Commercial, 0.55, 0.40);
        insert(High, Industrial, 0.40, 0.30);

        Self { rates }
    }
}

impl RateTable {
    /// Resolve the loss rate for a rated combination.
    ///
    /// NoRisk resolves to a defined 0.0 for any occupancy and floor bucket.
    /// For the other categories an unrecognized occupancy or an undefined
    /// floor bucket yields `None`, never zero.
    pub fn resolve(
        &self,
        risk: RiskCategory,
        occupancy: Option<OccupancyCategory>,
        floors: Option<FloorBucket>,
    ) -> Option<f64> {
        if risk == RiskCategory::NoRisk {
            return Some(0.0);
        }
        self.rates.get(&(risk, occupancy?, floors?)).copied()
    }
}
