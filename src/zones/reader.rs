//! Shapefile reading: geometry, zone-code attribute, and projection
//!
//! Converts a shapefile set into a `ZoneSource`: rings become `geo`
//! multipolygons (inner rings attached as holes to the outer ring containing
//! them), the zone-code column is identified by keyword match over the
//! attribute schema in natural column order, and the .prj sidecar fixes the
//! source's CRS.

use std::fs;
use std::path::Path;

use geo::{Contains, Coord, LineString, MultiPolygon, Polygon};
use log::warn;
use shapefile::dbase::FieldValue;
use shapefile::PolygonRing;

use super::crs::parse_prj;
use super::{ZonePolygon, ZoneSource};
use crate::error::ZoneSourceError;

/// Keywords identifying the zone-code attribute column, matched
/// case-insensitively as substrings in natural column order.
pub const ZONE_CODE_KEYWORDS: [&str; 3] = ["gridcode", "hasil_gridcode", "kode_grid"];

/// Read a shapefile set into a `ZoneSource`.
///
/// Expects the .dbf and .prj sidecars next to the .shp. A missing or
/// unsupported .prj fails the source; a missing zone-code column does not,
/// the source then simply contributes no codes.
pub fn read_source(shp_path: &Path, name: &str) -> Result<ZoneSource, ZoneSourceError> {
    let prj_path = shp_path.with_extension("prj");
    let wkt = fs::read_to_string(&prj_path)
        .map_err(|_| ZoneSourceError::MissingProjection(prj_path.display().to_string()))?;
    let crs = parse_prj(&wkt)?;

    let zone_code_field = zone_code_field(&shp_path.with_extension("dbf"))?;
    if zone_code_field.is_none() {
        warn!("no zone-code column in '{name}'; this source contributes no zone codes");
    }

    let shapes = shapefile::read_as::<_, shapefile::Polygon, shapefile::dbase::Record>(shp_path)?;
    let mut polygons = Vec::with_capacity(shapes.len());
    for (shape, record) in &shapes {
        let zone_code = zone_code_field
            .as_deref()
            .and_then(|field| record.get(field))
            .and_then(field_zone_code);
        let Some(geometry) = to_multipolygon(shape) else {
            continue;
        };
        if let Some(polygon) = ZonePolygon::new(geometry, zone_code) {
            polygons.push(polygon);
        }
    }

    Ok(ZoneSource {
        name: name.to_string(),
        crs,
        zone_code_field,
        polygons,
    })
}

/// First attribute column whose name matches a zone-code keyword.
fn zone_code_field(dbf_path: &Path) -> Result<Option<String>, ZoneSourceError> {
    let reader = shapefile::dbase::Reader::from_path(dbf_path)?;
    for field in reader.fields() {
        let lower = field.name().trim().to_lowercase();
        if ZONE_CODE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return Ok(Some(field.name().to_string()));
        }
    }
    Ok(None)
}

/// Coerce a dbase attribute value into an integer zone code.
fn field_zone_code(value: &FieldValue) -> Option<i32> {
    match value {
        FieldValue::Numeric(Some(v)) if v.is_finite() => Some(v.round() as i32),
        FieldValue::Float(Some(v)) if v.is_finite() => Some(v.round() as i32),
        FieldValue::Integer(v) => Some(*v),
        FieldValue::Double(v) if v.is_finite() => Some(v.round() as i32),
        FieldValue::Character(Some(s)) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// Convert shapefile rings into a `geo` multipolygon.
///
/// Outer rings become polygons; each inner ring is attached as a hole to the
/// first outer ring containing its first vertex. Degenerate rings (fewer than
/// four points) are dropped.
fn to_multipolygon(shape: &shapefile::Polygon) -> Option<MultiPolygon<f64>> {
    let mut outers: Vec<Polygon<f64>> = Vec::new();
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for ring in shape.rings() {
        let coords: Vec<Coord<f64>> = ring
            .points()
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect();
        if coords.len() < 4 {
            continue;
        }
        let line = LineString::from(coords);
        match ring {
            PolygonRing::Outer(_) => outers.push(Polygon::new(line, Vec::new())),
            PolygonRing::Inner(_) => holes.push(line),
        }
    }

    if outers.is_empty() {
        return None;
    }

    for hole in holes {
        let Some(anchor) = hole.points().next() else {
            continue;
        };
        if let Some(outer) = outers.iter_mut().find(|outer| outer.contains(&anchor)) {
            outer.interiors_push(hole);
        }
    }

    Some(MultiPolygon(outers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Intersects;
    use shapefile::Point;

    fn ring(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_field_zone_code_coercion() {
        assert_eq!(field_zone_code(&FieldValue::Numeric(Some(2.0))), Some(2));
        assert_eq!(field_zone_code(&FieldValue::Numeric(None)), None);
        assert_eq!(field_zone_code(&FieldValue::Integer(3)), Some(3));
        assert_eq!(
            field_zone_code(&FieldValue::Character(Some(" 1 ".to_string()))),
            Some(1)
        );
        assert_eq!(
            field_zone_code(&FieldValue::Character(Some("x".to_string()))),
            None
        );
    }

    #[test]
    fn test_hole_attachment() {
        // outer ring clockwise, inner ring counter-clockwise (shapefile convention)
        let shape = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(ring(&[
                (0.0, 0.0),
                (0.0, 10.0),
                (10.0, 10.0),
                (10.0, 0.0),
                (0.0, 0.0),
            ])),
            PolygonRing::Inner(ring(&[
                (4.0, 4.0),
                (6.0, 4.0),
                (6.0, 6.0),
                (4.0, 6.0),
                (4.0, 4.0),
            ])),
        ]);

        let geometry = to_multipolygon(&shape).expect("multipolygon");
        assert_eq!(geometry.0.len(), 1);
        assert_eq!(geometry.0[0].interiors().len(), 1);

        // inside the shell but outside the hole
        assert!(geo::Point::new(1.0, 1.0).intersects(&geometry));
        // inside the hole
        assert!(!geo::Point::new(5.0, 5.0).intersects(&geometry));
    }

    #[test]
    fn test_degenerate_rings_dropped() {
        let shape = shapefile::Polygon::with_rings(vec![PolygonRing::Outer(ring(&[
            (0.0, 0.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ]))]);
        assert!(to_multipolygon(&shape).is_none());
    }
}
