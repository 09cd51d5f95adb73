//! Great-circle helpers for signal proximity checks
//!
//! All inputs are decimal degrees. Distances are on a sphere of radius 6,371 km.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius used for haversine distances
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate distance between two points using the Haversine formula
/// Returns distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` slightly past 1.0 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Calculate initial bearing (forward azimuth) from point 1 to point 2
/// Returns degrees in [0, 360)
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let y = dlon.sin() * lat2_rad.cos();
    let x = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * dlon.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Wrap any finite angle into [0, 360)
pub fn normalize_bearing(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // -1e-15 % 360 + 360 rounds to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// The bearing pointing the opposite way
pub fn reciprocal_bearing(bearing: f64) -> f64 {
    normalize_bearing(bearing + 180.0)
}

/// One of the eight 45-degree compass sectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassOctant {
    #[serde(rename = "North")]
    North,
    #[serde(rename = "North-East")]
    NorthEast,
    #[serde(rename = "East")]
    East,
    #[serde(rename = "South-East")]
    SouthEast,
    #[serde(rename = "South")]
    South,
    #[serde(rename = "South-West")]
    SouthWest,
    #[serde(rename = "West")]
    West,
    #[serde(rename = "North-West")]
    NorthWest,
}

impl CompassOctant {
    /// Sectors in clockwise order starting at North
    pub const ALL: [CompassOctant; 8] = [
        CompassOctant::North,
        CompassOctant::NorthEast,
        CompassOctant::East,
        CompassOctant::SouthEast,
        CompassOctant::South,
        CompassOctant::SouthWest,
        CompassOctant::West,
        CompassOctant::NorthWest,
    ];

    /// Classify a bearing into its sector
    ///
    /// Sector `k` covers `[k*45 - 22.5, k*45 + 22.5)`, so a value sitting exactly
    /// on a boundary belongs to the sector clockwise of it. North covers
    /// `>= 337.5` and `< 22.5`. Out-of-range bearings are wrapped first.
    pub fn from_bearing(bearing: f64) -> Self {
        let bearing = normalize_bearing(bearing);
        let index = ((bearing + 22.5) / 45.0).floor() as usize % 8;
        Self::ALL[index]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompassOctant::North => "North",
            CompassOctant::NorthEast => "North-East",
            CompassOctant::East => "East",
            CompassOctant::SouthEast => "South-East",
            CompassOctant::South => "South",
            CompassOctant::SouthWest => "South-West",
            CompassOctant::West => "West",
            CompassOctant::NorthWest => "North-West",
        }
    }
}

impl fmt::Display for CompassOctant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
