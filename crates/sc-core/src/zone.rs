use crate::error::{ErrorCode, ScError, ScResult};
use crate::ids::ZoneId;
use sc_geo::{Circle, GeoPoint};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Translucent blue, ARGB.
pub const DEFAULT_FILL_COLOR: u32 = 0x6639_A1FF;
pub const DEFAULT_STROKE_COLOR: u32 = 0xFF39_A1FF;
pub const DEFAULT_STROKE_WIDTH_PX: f32 = 4.0;
pub const HAZARD_FILL_COLOR: u32 = 0x50FF_0000;
pub const HAZARD_STROKE_COLOR: u32 = 0xFFFF_0000;

pub const SELF_ZONE_LABEL: &str = "You";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Watch,
    Hazard,
}

impl ZoneKind {
    pub fn from_is_disaster(is_disaster: bool) -> Self {
        if is_disaster { Self::Hazard } else { Self::Watch }
    }

    pub fn is_disaster(self) -> bool {
        matches!(self, Self::Hazard)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Watch => "watch",
            Self::Hazard => "hazard",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering attributes. The engine never interprets these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneStyle {
    pub fill_color: u32,
    pub stroke_color: u32,
    pub stroke_width_px: f32,
}

impl Default for ZoneStyle {
    fn default() -> Self {
        Self {
            fill_color: DEFAULT_FILL_COLOR,
            stroke_color: DEFAULT_STROKE_COLOR,
            stroke_width_px: DEFAULT_STROKE_WIDTH_PX,
        }
    }
}

impl ZoneStyle {
    pub fn hazard() -> Self {
        Self {
            fill_color: HAZARD_FILL_COLOR,
            stroke_color: HAZARD_STROKE_COLOR,
            stroke_width_px: DEFAULT_STROKE_WIDTH_PX,
        }
    }

    pub fn default_for(kind: ZoneKind) -> Self {
        match kind {
            ZoneKind::Watch => Self::default(),
            ZoneKind::Hazard => Self::hazard(),
        }
    }
}

/// A circular geofence.
///
/// Center and kind are fixed at construction; only the radius can change,
/// and it is always positive.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceZone {
    id: ZoneId,
    center: GeoPoint,
    radius_m: f64,
    kind: ZoneKind,
    label: String,
    style: ZoneStyle,
}

impl GeofenceZone {
    pub fn new(id: ZoneId, center: GeoPoint, radius_m: f64, kind: ZoneKind) -> ScResult<Self> {
        validate_radius(&id, radius_m)?;
        Ok(Self {
            id,
            center,
            radius_m,
            kind,
            label: String::new(),
            style: ZoneStyle::default_for(kind),
        })
    }

    /// The bootstrap watch zone around the user's own position.
    pub fn self_zone(center: GeoPoint, radius_m: f64) -> ScResult<Self> {
        Ok(Self::new(ZoneId::generate(), center, radius_m, ZoneKind::Watch)?
            .with_label(SELF_ZONE_LABEL))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_style(mut self, style: ZoneStyle) -> Self {
        self.style = style;
        self
    }

    pub fn id(&self) -> &ZoneId {
        &self.id
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    pub fn is_hazard(&self) -> bool {
        self.kind == ZoneKind::Hazard
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn style(&self) -> ZoneStyle {
        self.style
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.center, self.radius_m)
    }

    pub fn with_radius(mut self, radius_m: f64) -> ScResult<Self> {
        self.set_radius(radius_m)?;
        Ok(self)
    }

    pub fn set_radius(&mut self, radius_m: f64) -> ScResult<()> {
        validate_radius(&self.id, radius_m)?;
        self.radius_m = radius_m;
        Ok(())
    }

    pub fn overlaps(&self, other: &GeofenceZone) -> bool {
        self.circle().overlaps(&other.circle())
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        self.circle().contains(point)
    }

    /// Label when set, otherwise a kind + coordinates description.
    pub fn display_name(&self) -> String {
        if !self.label.is_empty() {
            return self.label.clone();
        }
        let kind = match self.kind {
            ZoneKind::Watch => "Watch Area",
            ZoneKind::Hazard => "Disaster Zone",
        };
        format!("{} - {}", kind, self.center)
    }
}

fn validate_radius(id: &ZoneId, radius_m: f64) -> ScResult<()> {
    if radius_m.is_finite() && radius_m > 0.0 {
        Ok(())
    } else {
        Err(ScError::new(
            ErrorCode::InvalidZone,
            format!("zone {}: radius must be positive, got {}", id, radius_m),
        ))
    }
}
