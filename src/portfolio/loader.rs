//! CSV portfolio loader
//!
//! Maps configurable header names onto the required fields, applies the
//! optional inforce filter, normalizes each row, and splits rows with invalid
//! coordinates into a diagnostic subset.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use super::data::{PolicyRecord, PortfolioFilter};
use crate::error::PortfolioError;
use crate::normalize::{clean_coordinate, clean_count, clean_money, clean_year};
use crate::rating::OccupancyCategory;

/// Date format of the expiry column (day/month/year)
pub const EXPIRY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Portfolio ingestion options
///
/// Column names default to the source portfolio's headers; header cells are
/// whitespace-trimmed before matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioOptions {
    #[serde(default = "default_latitude_col")]
    pub latitude_col: String,

    #[serde(default = "default_longitude_col")]
    pub longitude_col: String,

    #[serde(default = "default_tsi_col")]
    pub tsi_col: String,

    #[serde(default = "default_occupancy_col")]
    pub occupancy_col: String,

    #[serde(default = "default_floors_col")]
    pub floors_col: String,

    #[serde(default = "default_year_col")]
    pub year_col: String,

    #[serde(default = "default_expiry_col")]
    pub expiry_col: String,

    #[serde(default)]
    pub filter: PortfolioFilter,

    /// Inforce cutoff: keep rows expiring strictly after this date
    #[serde(default = "default_cutoff")]
    pub cutoff: NaiveDate,
}

fn default_latitude_col() -> String { "Latitude".to_string() }
fn default_longitude_col() -> String { "Longitude".to_string() }
fn default_tsi_col() -> String { "TSI IDR".to_string() }
fn default_occupancy_col() -> String { "Kategori Okupasi".to_string() }
fn default_floors_col() -> String { "Jumlah Lantai".to_string() }
fn default_year_col() -> String { "UY".to_string() }
fn default_expiry_col() -> String { "EXPIRY DATE".to_string() }

fn default_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid cutoff date")
}

impl Default for PortfolioOptions {
    fn default() -> Self {
        Self {
            latitude_col: default_latitude_col(),
            longitude_col: default_longitude_col(),
            tsi_col: default_tsi_col(),
            occupancy_col: default_occupancy_col(),
            floors_col: default_floors_col(),
            year_col: default_year_col(),
            expiry_col: default_expiry_col(),
            filter: PortfolioFilter::Full,
            cutoff: default_cutoff(),
        }
    }
}

/// Row counts collected during ingestion
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_dropped_by_filter: usize,
    pub invalid_latitude: usize,
    pub invalid_longitude: usize,
    pub invalid_coordinate_rows: usize,
}

/// The ingested portfolio: valid records plus the invalid-coordinate subset
#[derive(Debug, Clone)]
pub struct Portfolio {
    /// Trimmed source header, in file order
    pub header: Vec<String>,
    pub records: Vec<PolicyRecord>,
    /// Rows dropped for invalid coordinates, cells verbatim
    pub invalid_rows: Vec<Vec<String>>,
    pub stats: LoadStats,
}

/// Load a portfolio from a CSV file on disk.
pub fn load_portfolio(path: &Path, options: &PortfolioOptions) -> Result<Portfolio, PortfolioError> {
    let file = File::open(path)?;
    load_portfolio_from_reader(file, options)
}

/// Load a portfolio from any reader producing delimited text.
pub fn load_portfolio_from_reader<R: Read>(
    reader: R,
    options: &PortfolioOptions,
) -> Result<Portfolio, PortfolioError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let header: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect();
    let column = |name: &str| header.iter().position(|h| h == name.trim());

    let mut missing = Vec::new();
    let mut require = |name: &String| {
        let idx = column(name);
        if idx.is_none() {
            missing.push(name.clone());
        }
        idx
    };
    let lat_idx = require(&options.latitude_col);
    let lon_idx = require(&options.longitude_col);
    let tsi_idx = require(&options.tsi_col);
    let occupancy_idx = require(&options.occupancy_col);
    let floors_idx = require(&options.floors_col);
    let year_idx = require(&options.year_col);
    if !missing.is_empty() {
        return Err(PortfolioError::MissingColumns(missing));
    }
    // require() returned Some for all of these once `missing` stayed empty
    let (lat_idx, lon_idx, tsi_idx, occupancy_idx, floors_idx, year_idx) = match (
        lat_idx, lon_idx, tsi_idx, occupancy_idx, floors_idx, year_idx,
    ) {
        (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)) => (a, b, c, d, e, f),
        _ => unreachable!("missing columns reported above"),
    };

    let expiry_idx = column(&options.expiry_col);
    let inforce = options.filter == PortfolioFilter::InforceOnly;
    if inforce && expiry_idx.is_none() {
        // the expiry column is optional; without it the filter cannot run
        warn!(
            "column '{}' not found; inforce filter skipped, using full data",
            options.expiry_col
        );
    }

    let mut stats = LoadStats::default();
    let mut records = Vec::new();
    let mut invalid_rows = Vec::new();

    for (i, result) in csv_reader.records().enumerate() {
        let record = result?;
        stats.rows_read += 1;

        let mut raw: Vec<String> = record.iter().map(|cell| cell.to_string()).collect();
        raw.resize(header.len(), String::new());
        let cell = |idx: usize| raw.get(idx).map(String::as_str).unwrap_or("");

        let expiry = expiry_idx
            .and_then(|idx| NaiveDate::parse_from_str(cell(idx).trim(), EXPIRY_DATE_FORMAT).ok());

        if inforce && expiry_idx.is_some() {
            // unparseable expiry behaves as "no expiry known": not inforce
            match expiry {
                Some(date) if date > options.cutoff => {}
                _ => {
                    stats.rows_dropped_by_filter += 1;
                    continue;
                }
            }
        }

        let latitude = clean_coordinate(cell(lat_idx));
        let longitude = clean_coordinate(cell(lon_idx));
        let (latitude, longitude) = match (latitude, longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            (lat, lon) => {
                if lat.is_none() {
                    stats.invalid_latitude += 1;
                }
                if lon.is_none() {
                    stats.invalid_longitude += 1;
                }
                invalid_rows.push(raw);
                continue;
            }
        };

        let occupancy_label = cell(occupancy_idx).trim().to_string();
        records.push(PolicyRecord {
            row: i + 2,
            latitude,
            longitude,
            tsi: clean_money(cell(tsi_idx)),
            occupancy: OccupancyCategory::from_label(&occupancy_label),
            occupancy_label,
            floor_count: clean_count(cell(floors_idx)),
            underwriting_year: clean_year(cell(year_idx)),
            expiry,
            raw,
        });
    }

    stats.invalid_coordinate_rows = invalid_rows.len();
    if stats.invalid_coordinate_rows > 0 {
        warn!(
            "{} row(s) dropped for invalid coordinates ({} latitude, {} longitude)",
            stats.invalid_coordinate_rows, stats.invalid_latitude, stats.invalid_longitude
        );
    }

    Ok(Portfolio {
        header,
        records,
        invalid_rows,
        stats,
    })
}
