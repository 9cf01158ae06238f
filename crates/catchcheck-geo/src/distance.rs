use catchcheck_core::models::Coordinate;
use geo::{Distance, HaversineMeasure, Point};

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometres (haversine)
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let haversine = HaversineMeasure::new(EARTH_RADIUS_KM * 1000.0);
    haversine.distance(to_point(a), to_point(b)) / 1000.0
}

fn to_point(coordinate: Coordinate) -> Point {
    Point::new(coordinate.longitude, coordinate.latitude)
}
