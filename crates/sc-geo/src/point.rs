use crate::circle::distance_meters;
use crate::error::GeoError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated latitude/longitude pair in degrees.
///
/// Latitude is always within `[-90, 90]` and longitude within `[-180, 180]`;
/// the only way to build one is through [`GeoPoint::new`] (or serde, which
/// goes through the same check).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoPointRepr", into = "GeoPointRepr")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct GeoPointRepr {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Clamps latitude and wraps longitude back into range. Used for
    /// generated vertices, which can step past a pole or the antimeridian.
    pub(crate) fn normalized(latitude: f64, longitude: f64) -> Self {
        let latitude = latitude.clamp(-90.0, 90.0);
        let longitude = if (-180.0..=180.0).contains(&longitude) {
            longitude
        } else {
            (longitude + 180.0).rem_euclid(360.0) - 180.0
        };
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_meters(*self, *other)
    }
}

impl TryFrom<GeoPointRepr> for GeoPoint {
    type Error = GeoError;

    fn try_from(value: GeoPointRepr) -> Result<Self, Self::Error> {
        GeoPoint::new(value.latitude, value.longitude)
    }
}

impl From<GeoPoint> for GeoPointRepr {
    fn from(value: GeoPoint) -> Self {
        Self {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert_eq!(
            GeoPoint::new(90.5, 0.0),
            Err(GeoError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            GeoPoint::new(0.0, -180.25),
            Err(GeoError::LongitudeOutOfRange(-180.25))
        );
        assert_eq!(GeoPoint::new(f64::NAN, 0.0), Err(GeoError::NonFinite));
        assert!(GeoPoint::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn normalized_wraps_longitude_past_antimeridian() {
        let point = GeoPoint::normalized(91.0, 181.0);
        assert_eq!(point.latitude(), 90.0);
        assert!((point.longitude() + 179.0).abs() < 1e-9);
    }

    #[test]
    fn deserialize_validates_range() {
        let ok: GeoPoint =
            serde_json::from_str(r#"{"latitude":14.5646,"longitude":120.993}"#).unwrap();
        assert_eq!(ok, GeoPoint::new(14.5646, 120.993).unwrap());

        let bad = serde_json::from_str::<GeoPoint>(r#"{"latitude":123.0,"longitude":0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn display_uses_four_decimals() {
        let point = GeoPoint::new(14.56461, 120.99304).unwrap();
        assert_eq!(point.to_string(), "14.5646, 120.9930");
    }
}
