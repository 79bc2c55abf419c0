//! Great-circle distance on the WGS-84 sphere.
//!
//! # Algorithm
//!
//! The haversine formula gives the central angle between two points on a
//! sphere from their latitudes and longitudes:
//!
//! ```text
//! a = sin²(Δφ/2) + cos(φ1)·cos(φ2)·sin²(Δλ/2)
//! d = 2R · asin(√a)
//! ```
//!
//! with R the mean Earth radius.

use std::collections::HashMap;

use crate::models::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Great-circle distance between two points, in meters.
///
/// # Examples
///
/// ```
/// use fleet_routing::distance::great_circle;
/// use fleet_routing::models::GeoPoint;
///
/// let a = GeoPoint::new(0.0, 0.0);
/// let b = GeoPoint::new(0.0, 1.0);
/// // One degree of longitude at the equator is about 111.2 km.
/// assert!((great_circle(a, b) - 111_195.0).abs() < 100.0);
/// ```
pub fn great_circle(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    2.0 * EARTH_RADIUS * h.sqrt().asin()
}

/// All symmetric pairwise great-circle distances between `points`.
///
/// Used for cache warm-up; never consults an external provider. Both
/// `(i, j)` and `(j, i)` are present for every pair of distinct indices.
pub fn pairwise_great_circle(points: &[GeoPoint]) -> HashMap<(usize, usize), f64> {
    let mut distances = HashMap::new();
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let d = great_circle(points[i], points[j]);
            distances.insert((i, j), d);
            distances.insert((j, i), d);
        }
    }
    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_distance_same_point() {
        let p = GeoPoint::new(10.5, 106.6);
        assert_eq!(great_circle(p, p), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // Ho Chi Minh City to Hanoi, roughly 1 137 km great-circle.
        let hcmc = GeoPoint::new(10.7769, 106.7009);
        let hanoi = GeoPoint::new(21.0278, 105.8342);
        let d = great_circle(hcmc, hanoi);
        assert!(d > 1_100_000.0 && d < 1_180_000.0, "got {d}");
    }

    #[test]
    fn test_pairwise_has_both_directions() {
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ];
        let distances = pairwise_great_circle(&points);
        assert_eq!(distances.len(), 6);
        assert_eq!(distances[&(0, 1)], distances[&(1, 0)]);
        assert_eq!(distances[&(1, 2)], distances[&(2, 1)]);
    }

    #[test]
    fn test_pairwise_empty() {
        assert!(pairwise_great_circle(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn test_symmetric(
            lat1 in -80.0..80.0f64,
            lon1 in -179.0..179.0f64,
            lat2 in -80.0..80.0f64,
            lon2 in -179.0..179.0f64,
        ) {
            let a = GeoPoint::new(lat1, lon1);
            let b = GeoPoint::new(lat2, lon2);
            let ab = great_circle(a, b);
            let ba = great_circle(b, a);
            prop_assert!((ab - ba).abs() < 1e-6);
            prop_assert!(ab >= 0.0);
        }
    }
}
