//! Great-circle distances.

use geo::{HaversineDistance, Point};

use crate::domain::GeoPoint;

/// Haversine distance between two points in kilometres.
///
/// Uses the mean earth radius (6371.0088 km).
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let a = Point::new(a.lon, a.lat);
    let b = Point::new(b.lon, b.lat);
    a.haversine_distance(&b) / 1000.0
}
