//! Geographic point type.

use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees (WGS-84).
///
/// Immutable value type; latitude and longitude are fixed at construction.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::GeoPoint;
///
/// let p = GeoPoint::new(10.776, 106.700);
/// assert_eq!(p.latitude(), 10.776);
/// assert_eq!(p.longitude(), 106.700);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}
