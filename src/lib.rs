//! Flood Exposure - batch rating engine for flood-exposed policy portfolios
//!
//! This library provides:
//! - Portfolio ingestion with coordinate/monetary text normalization
//! - Point-in-polygon spatial joins against flood-risk zone shapefiles
//! - Risk classification and fixed-table loss-rate resolution
//! - Probable Maximum Loss (PML) estimation per policy
//! - Multi-dimensional aggregation (underwriting year, occupancy, risk)

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod portfolio;
pub mod rating;
pub mod report;
pub mod spatial;
pub mod zones;

// Re-export commonly used types
pub use engine::{EnrichedRecord, ExposureEngine, RunDiagnostics, RunResult};
pub use error::{PortfolioError, ZoneSourceError};
pub use portfolio::{load_portfolio, load_portfolio_from_reader, Portfolio, PortfolioOptions};
pub use rating::{estimated_loss, FloorBucket, OccupancyCategory, RateTable, RiskCategory};
pub use zones::{load_zone_sources, ZoneLoad, ZonePolygon, ZoneSource};
