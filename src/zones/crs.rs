//! Coordinate reference systems for zone sources
//!
//! Portfolio points are geographic WGS84 (longitude/latitude degrees). Each
//! zone source carries a .prj sidecar in ESRI WKT; points are projected into
//! the source's system before intersection so a CRS mismatch can never
//! silently mis-join. Supported systems are geographic WGS84 (identity) and
//! the Transverse Mercator family (UTM, Gauss-Krueger) on the WGS84 ellipsoid,
//! which the Indonesian DGN95 datum shares. Anything else is refused and the
//! source is skipped.

use crate::error::ZoneSourceError;

// WGS84 ellipsoid
const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Reference system a zone source's coordinates live in
#[derive(Debug, Clone, PartialEq)]
pub enum Crs {
    /// Geographic longitude/latitude in degrees; projection is the identity
    Geographic,
    Tm(TmParams),
}

/// Transverse Mercator projection parameters (degrees and meters)
#[derive(Debug, Clone, PartialEq)]
pub struct TmParams {
    pub central_meridian: f64,
    pub latitude_of_origin: f64,
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl Crs {
    /// Project a geographic WGS84 point into this system.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            Crs::Geographic => (lon, lat),
            Crs::Tm(params) => tm_forward(params, lon, lat),
        }
    }
}

/// Classify a .prj WKT string into a supported CRS.
pub fn parse_prj(wkt: &str) -> Result<Crs, ZoneSourceError> {
    let upper = wkt.trim().to_uppercase();
    if upper.starts_with("PROJCS") {
        if upper.contains("TRANSVERSE_MERCATOR") {
            Ok(Crs::Tm(TmParams {
                central_meridian: wkt_parameter(&upper, "CENTRAL_MERIDIAN").unwrap_or(0.0),
                latitude_of_origin: wkt_parameter(&upper, "LATITUDE_OF_ORIGIN").unwrap_or(0.0),
                scale_factor: wkt_parameter(&upper, "SCALE_FACTOR").unwrap_or(1.0),
                false_easting: wkt_parameter(&upper, "FALSE_EASTING").unwrap_or(0.0),
                false_northing: wkt_parameter(&upper, "FALSE_NORTHING").unwrap_or(0.0),
            }))
        } else {
            Err(ZoneSourceError::UnsupportedProjection(wkt_name(wkt)))
        }
    } else if upper.starts_with("GEOGCS") {
        Ok(Crs::Geographic)
    } else {
        Err(ZoneSourceError::UnsupportedProjection(wkt_name(wkt)))
    }
}

/// First quoted string in the WKT, i.e. the CRS name
fn wkt_name(wkt: &str) -> String {
    let mut quoted = wkt.split('"');
    quoted.next();
    quoted.next().unwrap_or("unknown").to_string()
}

/// Extract `PARAMETER["name",value]` from uppercased WKT.
fn wkt_parameter(upper: &str, name: &str) -> Option<f64> {
    let tag = format!("PARAMETER[\"{name}\"");
    let after_tag = upper.find(&tag)? + tag.len();
    let rest = &upper[after_tag..];
    let after_comma = rest.find(',')? + 1;
    let end = rest[after_comma..].find(']')?;
    rest[after_comma..after_comma + end].trim().parse().ok()
}

/// Forward Transverse Mercator projection on the WGS84 ellipsoid.
///
/// Standard series expansion (Snyder, Map Projections - A Working Manual,
/// eqs. 8-9..8-13). Millimeter-level accuracy within a UTM zone, far tighter
/// than the point-in-polygon joins here need.
fn tm_forward(params: &TmParams, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    let phi = lat_deg.to_radians();
    let lam = lon_deg.to_radians();
    let lam0 = params.central_meridian.to_radians();
    let phi0 = params.latitude_of_origin.to_radians();
    let k0 = params.scale_factor;

    let e2 = 2.0 * WGS84_F - WGS84_F * WGS84_F;
    let ep2 = e2 / (1.0 - e2);

    let n = WGS84_A / (1.0 - e2 * phi.sin().powi(2)).sqrt();
    let t = phi.tan().powi(2);
    let c = ep2 * phi.cos().powi(2);
    let a = (lam - lam0) * phi.cos();

    let m = meridional_arc(phi, e2);
    let m0 = meridional_arc(phi0, e2);

    let easting = k0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);
    let northing = k0
        * (m - m0
            + n * phi.tan()
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

    (easting + params.false_easting, northing + params.false_northing)
}

/// Meridional arc length from the equator to latitude phi.
fn meridional_arc(phi: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}
