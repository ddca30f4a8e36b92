//! Zip bundle extraction and shapefile discovery
//!
//! Zone sources typically arrive as .zip bundles holding a shapefile set
//! (.shp + .shx + .dbf + .prj). Bundles are extracted into a scratch
//! directory; macOS resource-fork noise (`._*` files, `__MACOSX` directories)
//! is ignored when discovering the shapefile.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use tempfile::TempDir;
use zip::ZipArchive;

use crate::error::ZoneSourceError;

/// Extract a .zip bundle and locate its shapefile.
///
/// The returned `TempDir` owns the scratch extraction directory; the
/// shapefile path points inside it and is valid only while the guard lives.
pub fn extract_bundle(path: &Path) -> Result<(TempDir, PathBuf), ZoneSourceError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    let scratch = tempfile::tempdir()?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // enclosed_name rejects entries that would escape the scratch dir
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            continue;
        };
        let target = scratch.path().join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    let shapefile = find_shapefile(scratch.path())?;
    Ok((scratch, shapefile))
}

/// Find the shapefile to process under `root`.
///
/// Candidates are collected recursively, resource-fork entries excluded, and
/// sorted by path; the first is used so the choice does not depend on
/// directory iteration order. Extra shapefiles in the same bundle are logged.
pub fn find_shapefile(root: &Path) -> Result<PathBuf, ZoneSourceError> {
    let mut candidates = Vec::new();
    collect_shapefiles(root, &mut candidates)?;
    candidates.sort();

    match candidates.split_first() {
        None => Err(ZoneSourceError::NoShapefile(root.display().to_string())),
        Some((first, rest)) => {
            if !rest.is_empty() {
                warn!(
                    "{} extra shapefile(s) in {}; using {}",
                    rest.len(),
                    root.display(),
                    first.display()
                );
            }
            Ok(first.clone())
        }
    }
}

fn collect_shapefiles(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_resource_fork(&path) {
            continue;
        }
        if path.is_dir() {
            collect_shapefiles(&path, out)?;
        } else if path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("shp"))
            .unwrap_or(false)
        {
            out.push(path);
        }
    }
    Ok(())
}

fn is_resource_fork(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with("._") || name == "__MACOSX")
        .unwrap_or(false)
}
