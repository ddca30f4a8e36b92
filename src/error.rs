//! Error taxonomy for the rating pipeline
//!
//! Only portfolio-level failures are fatal: a missing required column or an
//! unreadable portfolio file halts the run with no partial output. Zone-source
//! failures are per-source and reported as diagnostics, never as hard errors.

use thiserror::Error;

/// Fatal errors raised while ingesting the policy portfolio
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// One or more required columns are absent from the input header
    #[error("required columns not found: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("portfolio I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("portfolio CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Per-source errors raised while loading a zone-polygon source
///
/// These never abort the run: the failing source is skipped and the skip is
/// surfaced in the run diagnostics.
#[derive(Debug, Error)]
pub enum ZoneSourceError {
    #[error("no shapefile found in {0}")]
    NoShapefile(String),

    #[error("missing projection file {0}")]
    MissingProjection(String),

    /// The .prj describes a projection the engine cannot reproject into.
    /// A mismatched CRS would silently mis-join, so the source is refused.
    #[error("unsupported projection: {0}")]
    UnsupportedProjection(String),

    #[error("zone source I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zone bundle error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("attribute table error: {0}")]
    Dbase(#[from] shapefile::dbase::Error),
}
