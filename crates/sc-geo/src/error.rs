use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoError {
    NonFinite,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    TooFewSteps(u32),
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite => write!(f, "coordinate is not a finite number"),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {} outside [-90, 90]", value)
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {} outside [-180, 180]", value)
            }
            Self::TooFewSteps(steps) => {
                write!(f, "polygon needs at least 3 steps, got {}", steps)
            }
        }
    }
}

impl std::error::Error for GeoError {}
