//! Spatial join: point-in-polygon assignment of zone codes
//!
//! Each zone source is joined independently (and in parallel), with portfolio
//! points projected into the source's CRS first. The per-source results are
//! then merged into a single zone code per distinct (longitude, latitude)
//! pair. The merge tie-break is deterministic: the highest-risk candidate
//! wins; among candidates of equal severity the first in (source order,
//! polygon order) is kept. The merged result is therefore independent of the
//! order sources finish in.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use geo::Intersects;
use rayon::prelude::*;

use crate::rating::RiskCategory;
use crate::zones::ZoneSource;

/// Hashable identity of a geographic point (exact bit pattern)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    lon_bits: u64,
    lat_bits: u64,
}

impl PointKey {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon_bits: lon.to_bits(),
            lat_bits: lat.to_bits(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    zone_code: Option<i32>,
    source: usize,
    polygon: usize,
}

/// Assign one zone code per distinct point.
///
/// Points absent from the result intersected no polygon in any source. The
/// intersects predicate counts the polygon boundary as contained.
pub fn assign_zone_codes(
    points: &[(f64, f64)],
    sources: &[ZoneSource],
) -> HashMap<PointKey, Option<i32>> {
    let mut unique = Vec::new();
    let mut seen = HashSet::new();
    for &(lon, lat) in points {
        if seen.insert(PointKey::new(lon, lat)) {
            unique.push((lon, lat));
        }
    }

    let per_source: Vec<Vec<(PointKey, Candidate)>> = sources
        .par_iter()
        .enumerate()
        .map(|(source_idx, source)| join_source(&unique, source, source_idx))
        .collect();

    let mut best: HashMap<PointKey, Candidate> = HashMap::new();
    for candidates in per_source {
        for (key, candidate) in candidates {
            match best.get(&key) {
                Some(incumbent) if !wins_over(&candidate, incumbent) => {}
                _ => {
                    best.insert(key, candidate);
                }
            }
        }
    }

    best.into_iter()
        .map(|(key, candidate)| (key, candidate.zone_code))
        .collect()
}

/// Highest risk wins; equal severity falls back to (source, polygon) order.
fn wins_over(challenger: &Candidate, incumbent: &Candidate) -> bool {
    let challenger_risk = RiskCategory::from_zone_code(challenger.zone_code);
    let incumbent_risk = RiskCategory::from_zone_code(incumbent.zone_code);
    match challenger_risk.cmp(&incumbent_risk) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            (challenger.source, challenger.polygon) < (incumbent.source, incumbent.polygon)
        }
    }
}

fn join_source(
    points: &[(f64, f64)],
    source: &ZoneSource,
    source_idx: usize,
) -> Vec<(PointKey, Candidate)> {
    let mut hits = Vec::new();
    for &(lon, lat) in points {
        let key = PointKey::new(lon, lat);
        let (x, y) = source.crs.project(lon, lat);
        let point = geo::Point::new(x, y);
        for (polygon_idx, zone) in source.polygons.iter().enumerate() {
            // cheap bbox rejection before the exact test
            if x < zone.bbox.min().x
                || x > zone.bbox.max().x
                || y < zone.bbox.min().y
                || y > zone.bbox.max().y
            {
                continue;
            }
            if point.intersects(&zone.geometry) {
                hits.push((
                    key,
                    Candidate {
                        zone_code: zone.zone_code,
                        source: source_idx,
                        polygon: polygon_idx,
                    },
                ));
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::{Crs, ZonePolygon};
    use geo::{LineString, MultiPolygon, Polygon};

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (max_x, min_y),
                (max_x, max_y),
                (min_x, max_y),
                (min_x, min_y),
            ]),
            Vec::new(),
        )])
    }

    fn source(name: &str, polygons: Vec<ZonePolygon>) -> ZoneSource {
        ZoneSource {
            name: name.to_string(),
            crs: Crs::Geographic,
            zone_code_field: Some("GRIDCODE".to_string()),
            polygons,
        }
    }

    fn zone(min_x: f64, min_y: f64, max_x: f64, max_y: f64, code: Option<i32>) -> ZonePolygon {
        ZonePolygon::new(square(min_x, min_y, max_x, max_y), code).expect("zone polygon")
    }

    #[test]
    fn test_left_join_keeps_unmatched_points() {
        let sources = vec![source("a", vec![zone(0.0, 0.0, 1.0, 1.0, Some(2))])];
        let points = vec![(0.5, 0.5), (5.0, 5.0)];

        let assigned = assign_zone_codes(&points, &sources);
        assert_eq!(assigned.get(&PointKey::new(0.5, 0.5)), Some(&Some(2)));
        // no entry: downstream classification yields NoRisk
        assert_eq!(assigned.get(&PointKey::new(5.0, 5.0)), None);
    }

    #[test]
    fn test_boundary_counts_as_contained() {
        let sources = vec![source("a", vec![zone(0.0, 0.0, 1.0, 1.0, Some(1))])];
        let points = vec![(0.0, 0.5), (1.0, 1.0)];

        let assigned = assign_zone_codes(&points, &sources);
        assert_eq!(assigned.get(&PointKey::new(0.0, 0.5)), Some(&Some(1)));
        assert_eq!(assigned.get(&PointKey::new(1.0, 1.0)), Some(&Some(1)));
    }

    #[test]
    fn test_highest_risk_wins_across_sources() {
        let low_first = vec![
            source("low", vec![zone(0.0, 0.0, 1.0, 1.0, Some(1))]),
            source("high", vec![zone(0.0, 0.0, 1.0, 1.0, Some(3))]),
        ];
        let high_first = vec![
            source("high", vec![zone(0.0, 0.0, 1.0, 1.0, Some(3))]),
            source("low", vec![zone(0.0, 0.0, 1.0, 1.0, Some(1))]),
        ];
        let points = vec![(0.5, 0.5)];

        let a = assign_zone_codes(&points, &low_first);
        let b = assign_zone_codes(&points, &high_first);
        // order of sources does not matter
        assert_eq!(a.get(&PointKey::new(0.5, 0.5)), Some(&Some(3)));
        assert_eq!(b.get(&PointKey::new(0.5, 0.5)), Some(&Some(3)));
    }

    #[test]
    fn test_equal_severity_keeps_first_source() {
        let sources = vec![
            source("a", vec![zone(0.0, 0.0, 1.0, 1.0, Some(7))]),
            source("b", vec![zone(0.0, 0.0, 1.0, 1.0, Some(9))]),
        ];
        let points = vec![(0.5, 0.5)];

        // both codes are outside {1,2,3}: equal NoRisk severity, first wins
        let assigned = assign_zone_codes(&points, &sources);
        assert_eq!(assigned.get(&PointKey::new(0.5, 0.5)), Some(&Some(7)));
    }

    #[test]
    fn test_uncoded_polygon_does_not_shadow_coded_one() {
        let sources = vec![
            source("uncoded", vec![zone(0.0, 0.0, 1.0, 1.0, None)]),
            source("coded", vec![zone(0.0, 0.0, 1.0, 1.0, Some(2))]),
        ];
        let points = vec![(0.5, 0.5)];

        let assigned = assign_zone_codes(&points, &sources);
        assert_eq!(assigned.get(&PointKey::new(0.5, 0.5)), Some(&Some(2)));
    }

    #[test]
    fn test_duplicate_points_collapse() {
        let sources = vec![source("a", vec![zone(0.0, 0.0, 1.0, 1.0, Some(2))])];
        let points = vec![(0.5, 0.5), (0.5, 0.5), (0.5, 0.5)];

        let assigned = assign_zone_codes(&points, &sources);
        assert_eq!(assigned.len(), 1);
    }
}
