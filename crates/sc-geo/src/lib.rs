//! Coordinate math for circular geofences.
//!
//! Everything in this crate is pure: great-circle distance, the inclusive
//! circle overlap test and the flat-earth polygon approximation used to draw
//! a circle on a map.

mod circle;
mod error;
mod point;
mod polygon;

pub use circle::{circles_overlap, distance_meters, Circle, EARTH_RADIUS_M};
pub use error::GeoError;
pub use point::GeoPoint;
pub use polygon::{to_polygon, DEFAULT_POLYGON_STEPS, METERS_PER_DEGREE, MIN_POLYGON_STEPS};
