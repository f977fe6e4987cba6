use crate::error::GeoError;
use crate::point::GeoPoint;
use crate::polygon::to_polygon;
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_009.0;

/// Great-circle distance between two points (haversine, spherical earth).
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    let half_dlat = ((lat_b - lat_a) / 2.0).abs();
    let half_dlng = ((b.longitude() - a.longitude()).to_radians() / 2.0).abs();

    let h = half_dlat.sin().powi(2) + lat_a.cos() * lat_b.cos() * half_dlng.sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: GeoPoint,
    pub radius_m: f64,
}

impl Circle {
    pub fn new(center: GeoPoint, radius_m: f64) -> Self {
        Self { center, radius_m }
    }

    /// Touching circles count as overlapping.
    pub fn overlaps(&self, other: &Circle) -> bool {
        distance_meters(self.center, other.center) <= self.radius_m + other.radius_m
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        distance_meters(self.center, point) <= self.radius_m
    }

    pub fn to_polygon(&self, steps: u32) -> Result<Vec<GeoPoint>, GeoError> {
        to_polygon(self.center, self.radius_m, steps)
    }
}

pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    a.overlaps(b)
}
