use crate::error::GeoError;
use crate::point::GeoPoint;
use std::f64::consts::TAU;

pub const DEFAULT_POLYGON_STEPS: u32 = 64;
pub const MIN_POLYGON_STEPS: u32 = 3;

/// Equirectangular approximation of one degree of latitude, in meters.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

// Keeps the longitude span finite near the poles.
const MIN_COS_LATITUDE: f64 = 1e-6;

/// Approximates a circle as a closed ring of `steps + 1` vertices.
///
/// Vertices are sampled at equal angular increments using a flat-earth
/// approximation, which is accurate for the small radii geofences use. The
/// last vertex repeats the first so renderers can draw the ring directly.
pub fn to_polygon(center: GeoPoint, radius_m: f64, steps: u32) -> Result<Vec<GeoPoint>, GeoError> {
    if steps < MIN_POLYGON_STEPS {
        return Err(GeoError::TooFewSteps(steps));
    }

    let d_lat = radius_m / METERS_PER_DEGREE;
    let cos_lat = center.latitude().to_radians().cos().max(MIN_COS_LATITUDE);
    let d_lng = radius_m / (METERS_PER_DEGREE * cos_lat);

    let mut ring = Vec::with_capacity(steps as usize + 1);
    for i in 0..steps {
        let t = TAU * f64::from(i) / f64::from(steps);
        ring.push(GeoPoint::normalized(
            center.latitude() + d_lat * t.sin(),
            center.longitude() + d_lng * t.cos(),
        ));
    }
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    Ok(ring)
}
