//! Policy portfolio ingestion

mod data;
pub mod loader;

pub use data::{PolicyRecord, PortfolioFilter};
pub use loader::{load_portfolio, load_portfolio_from_reader, LoadStats, Portfolio, PortfolioOptions};
