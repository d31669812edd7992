//! Coordinates, track points and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for every distance in the crate.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Number of decimal places coordinates are stored and reported at.
pub const COORDINATE_DECIMALS: i32 = 6;

/// Two rounded coordinates closer than this (in degrees) are the same position.
const SAME_POSITION_EPSILON: f64 = 1e-10;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns this coordinate normalized to [`COORDINATE_DECIMALS`] places.
    ///
    /// Rounding is idempotent, so boundary points produced by adjacent legs
    /// compare equal after normalization.
    pub fn rounded(self) -> Self {
        Self {
            latitude: round_degrees(self.latitude),
            longitude: round_degrees(self.longitude),
        }
    }

    /// Whether two coordinates denote the same position at stored precision.
    pub fn same_position(&self, other: &Coordinate) -> bool {
        (self.latitude - other.latitude).abs() < SAME_POSITION_EPSILON
            && (self.longitude - other.longitude).abs() < SAME_POSITION_EPSILON
    }

    /// Great-circle distance to another coordinate in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    /// Encodes the coordinate the way the portal expects: `"lon,lat"`.
    pub fn location(&self) -> String {
        format!(
            "{:.prec$},{:.prec$}",
            self.longitude,
            self.latitude,
            prec = COORDINATE_DECIMALS as usize
        )
    }
}

/// Rounds a value in degrees to [`COORDINATE_DECIMALS`] places.
pub fn round_degrees(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_DECIMALS);
    (value * scale).round() / scale
}

/// A timestamped point of the assembled route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    #[serde(rename = "latLng")]
    pub lat_lng: Coordinate,
    /// `"lon,lat"` at stored precision.
    pub location: String,
    /// Step counter reported by the mobile client; always zero.
    pub step: u32,
    /// Epoch milliseconds.
    #[serde(rename = "locatetime")]
    pub locate_time_ms: i64,
}

impl TrackPoint {
    pub fn new(coordinate: Coordinate, locate_time_ms: i64) -> Self {
        let lat_lng = coordinate.rounded();
        Self {
            location: lat_lng.location(),
            lat_lng,
            step: 0,
            locate_time_ms,
        }
    }
}

/// Calculates the haversine distance between two points in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Sums the distance between consecutive coordinates.
pub fn path_distance<'a>(coordinates: impl IntoIterator<Item = &'a Coordinate>) -> f64 {
    let mut total = 0.0;
    let mut previous: Option<&Coordinate> = None;
    for current in coordinates {
        if let Some(prev) = previous {
            total += prev.distance_to(current);
        }
        previous = Some(current);
    }
    total
}
