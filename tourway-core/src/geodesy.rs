//! Correction of obfuscated map coordinates to true geodetic coordinates.
//!
//! Domestic map data arrives in the GCJ-02 system, a deliberately offset
//! variant of WGS-84 defined only inside an approximate national bounding
//! box. The forward obfuscation has no published closed-form inverse;
//! [`gcj02_to_wgs84`] estimates the local offset at the given point and
//! subtracts it, a single-step approximation accurate to a few metres.
//!
//! The constants and drift polynomials below are a fixed external contract
//! shared with the upstream map provider. Any numeric deviation moves every
//! rendered position; do not "simplify" them.

use geo::Coord;
use std::str::FromStr;

use crate::error::PlanError;

const PI: f64 = 3.141_592_653_589_793_24;
/// Semi-major axis of the reference ellipsoid, metres.
const A: f64 = 6_378_245.0;
/// First eccentricity squared of the reference ellipsoid.
const EE: f64 = 0.006_693_421_622_965_943_23;

/// Returns `true` when the point lies outside the territory the obfuscation
/// is defined for. Such points are passed through unchanged.
#[must_use]
pub fn out_of_territory(lon: f64, lat: f64) -> bool {
    !(72.004..=137.8347).contains(&lon) || !(0.8293..=55.8271).contains(&lat)
}

/// Longitude drift as a nonlinear function of the recentred point.
fn lon_drift(x: f64, y: f64) -> f64 {
    let mut ret =
        300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// Latitude drift as a nonlinear function of the recentred point.
fn lat_drift(x: f64, y: f64) -> f64 {
    let mut ret =
        -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// Correct one obfuscated point to true geodetic coordinates.
///
/// Deterministic and side-effect free. Points outside the territory are
/// returned unchanged.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tourway_core::geodesy::gcj02_to_wgs84;
///
/// // Outside the territory the transform is the identity.
/// let abroad = gcj02_to_wgs84(Coord { x: 200.0, y: 60.0 });
/// assert_eq!(abroad, Coord { x: 200.0, y: 60.0 });
/// ```
#[must_use]
pub fn gcj02_to_wgs84(point: Coord<f64>) -> Coord<f64> {
    let (lon, lat) = (point.x, point.y);
    if out_of_territory(lon, lat) {
        return point;
    }
    let mut d_lat = lat_drift(lon - 105.0, lat - 35.0);
    let mut d_lon = lon_drift(lon - 105.0, lat - 35.0);
    let rad_lat = lat / 180.0 * PI;
    let magic = 1.0 - EE * rad_lat.sin() * rad_lat.sin();
    let sqrt_magic = magic.sqrt();
    // Meridional radius scales the latitude delta; the radius of curvature
    // in the prime vertical scales the longitude delta.
    d_lat = (d_lat * 180.0) / ((A * (1.0 - EE)) / (magic * sqrt_magic) * PI);
    d_lon = (d_lon * 180.0) / (A / sqrt_magic * rad_lat.cos() * PI);
    let shifted_lon = lon + d_lon;
    let shifted_lat = lat + d_lat;
    Coord {
        x: 2.0 * lon - shifted_lon,
        y: 2.0 * lat - shifted_lat,
    }
}

/// Element order of raw coordinate pairs handed to the batch transform.
///
/// Upstream files declare their pair order as a string; an unrecognised
/// declaration is a configuration error, not a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordOrder {
    /// Pairs are `(longitude, latitude)`.
    LonLat,
    /// Pairs are `(latitude, longitude)`.
    LatLon,
}

impl CoordOrder {
    /// Return the order as the declaration string used by data files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LonLat => "lon_lat",
            Self::LatLon => "lat_lon",
        }
    }
}

impl std::fmt::Display for CoordOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordOrder {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lon_lat" => Ok(Self::LonLat),
            "lat_lon" => Ok(Self::LatLon),
            other => Err(PlanError::UnknownCoordOrder {
                value: other.to_owned(),
            }),
        }
    }
}

/// Correct a sequence of raw pairs, honouring and preserving the declared
/// element order.
///
/// # Examples
/// ```
/// use tourway_core::geodesy::{gcj02_to_wgs84_batch, CoordOrder};
///
/// let out = gcj02_to_wgs84_batch(&[(200.0, 60.0)], CoordOrder::LonLat);
/// assert_eq!(out, vec![(200.0, 60.0)]);
/// ```
#[must_use]
pub fn gcj02_to_wgs84_batch(pairs: &[(f64, f64)], order: CoordOrder) -> Vec<(f64, f64)> {
    pairs
        .iter()
        .map(|&(first, second)| {
            let point = match order {
                CoordOrder::LonLat => Coord {
                    x: first,
                    y: second,
                },
                CoordOrder::LatLon => Coord {
                    x: second,
                    y: first,
                },
            };
            let corrected = gcj02_to_wgs84(point);
            match order {
                CoordOrder::LonLat => (corrected.x, corrected.y),
                CoordOrder::LatLon => (corrected.y, corrected.x),
            }
        })
        .collect()
}
