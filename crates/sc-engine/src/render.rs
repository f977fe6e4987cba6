use sc_core::{GeofenceZone, ZoneId, ZoneKind, ZoneStyle};
use sc_geo::{GeoError, GeoPoint};
use serde::Serialize;

/// What the map layer needs to draw one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonePolygon {
    pub zone_id: ZoneId,
    pub kind: ZoneKind,
    pub vertices: Vec<GeoPoint>,
    pub style: ZoneStyle,
}

impl ZonePolygon {
    pub fn for_zone(zone: &GeofenceZone, steps: u32) -> Result<Self, GeoError> {
        Ok(Self {
            zone_id: zone.id().clone(),
            kind: zone.kind(),
            vertices: zone.circle().to_polygon(steps)?,
            style: zone.style(),
        })
    }
}

/// The map collaborator. The store tells it when a polygon appears or goes
/// away; it never hands out references to whatever the renderer builds.
pub trait RenderSink: Send + Sync {
    fn attach(&self, polygon: &ZonePolygon);
    fn detach(&self, zone_id: &ZoneId);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl RenderSink for NoopRenderer {
    fn attach(&self, _polygon: &ZonePolygon) {}

    fn detach(&self, _zone_id: &ZoneId) {}
}
