//! Flood-risk zone sources
//!
//! A zone source is a read-only set of polygons, each optionally carrying an
//! integer zone code, in a known CRS. Sources come from .zip bundles, bare
//! .shp paths, or directories holding a shapefile set. Loading is per-source
//! fault tolerant: a source that cannot be read is skipped and reported, and
//! the run continues with whatever remains.

pub mod bundle;
pub mod crs;
pub mod reader;

use std::path::{Path, PathBuf};

use geo::{BoundingRect, MultiPolygon, Rect};
use log::{info, warn};
use serde::Serialize;

pub use crs::Crs;

use crate::error::ZoneSourceError;

/// One zone polygon: geometry, bounding box prefilter, optional zone code
#[derive(Debug, Clone)]
pub struct ZonePolygon {
    pub geometry: MultiPolygon<f64>,
    pub bbox: Rect<f64>,
    pub zone_code: Option<i32>,
}

impl ZonePolygon {
    /// Returns `None` for empty geometry (no bounding box).
    pub fn new(geometry: MultiPolygon<f64>, zone_code: Option<i32>) -> Option<Self> {
        let bbox = geometry.bounding_rect()?;
        Some(Self {
            geometry,
            bbox,
            zone_code,
        })
    }
}

/// A loaded zone-polygon source
#[derive(Debug, Clone)]
pub struct ZoneSource {
    pub name: String,
    pub crs: Crs,
    /// Attribute column the zone codes came from, when one was identified
    pub zone_code_field: Option<String>,
    pub polygons: Vec<ZonePolygon>,
}

/// A source that could not be loaded, with the reason
#[derive(Debug, Clone, Serialize)]
pub struct SourceSkip {
    pub source: String,
    pub reason: String,
}

/// Result of loading a batch of zone sources
#[derive(Debug, Clone, Default)]
pub struct ZoneLoad {
    pub sources: Vec<ZoneSource>,
    pub skipped: Vec<SourceSkip>,
}

/// Load every given zone source, skipping and reporting failures.
///
/// Never fails as a whole: when every source fails the result simply has no
/// sources and the spatial join assigns no zone codes.
pub fn load_zone_sources(paths: &[PathBuf]) -> ZoneLoad {
    let mut load = ZoneLoad::default();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match load_single(path, &name) {
            Ok(source) => {
                info!(
                    "loaded zone source '{}': {} polygon(s), zone-code column {:?}",
                    name,
                    source.polygons.len(),
                    source.zone_code_field
                );
                load.sources.push(source);
            }
            Err(err) => {
                warn!("skipping zone source '{name}': {err}");
                load.skipped.push(SourceSkip {
                    source: name,
                    reason: err.to_string(),
                });
            }
        }
    }
    load
}

fn load_single(path: &Path, name: &str) -> Result<ZoneSource, ZoneSourceError> {
    if path.is_dir() {
        let shp = bundle::find_shapefile(path)?;
        return reader::read_source(&shp, name);
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("zip") => {
            let (scratch, shp) = bundle::extract_bundle(path)?;
            let source = reader::read_source(&shp, name);
            // scratch dir lives until the shapefile set is fully read
            drop(scratch);
            source
        }
        Some(ext) if ext.eq_ignore_ascii_case("shp") => reader::read_source(path, name),
        _ => Err(ZoneSourceError::NoShapefile(path.display().to_string())),
    }
}
