use crate::render::{RenderSink, ZonePolygon};
use sc_core::{ErrorCode, GeofenceZone, ScError, ScResult, ZoneId, ZoneKind};
use sc_geo::MIN_POLYGON_STEPS;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a `replace_all` kept and what it turned away.
#[derive(Debug, Default)]
pub struct ReplaceOutcome {
    pub detached: usize,
    pub attached: usize,
    pub skipped: Vec<ScError>,
}

/// The session's zones, in insertion order.
///
/// Watch and hazard zones share one list (and one id space); the two
/// partitions are views filtered on kind. Every change is mirrored to the
/// renderer as attach/detach calls.
pub struct ZoneStore {
    zones: Vec<GeofenceZone>,
    renderer: Arc<dyn RenderSink>,
    polygon_steps: u32,
}

impl ZoneStore {
    pub fn new(renderer: Arc<dyn RenderSink>, polygon_steps: u32) -> ScResult<Self> {
        if polygon_steps < MIN_POLYGON_STEPS {
            return Err(ScError::new(
                ErrorCode::InvalidInput,
                format!("polygon steps must be at least {}", MIN_POLYGON_STEPS),
            ));
        }
        Ok(Self {
            zones: Vec::new(),
            renderer,
            polygon_steps,
        })
    }

    pub fn all(&self, kind: ZoneKind) -> Vec<GeofenceZone> {
        self.iter(kind).cloned().collect()
    }

    pub fn iter(&self, kind: ZoneKind) -> impl Iterator<Item = &GeofenceZone> {
        self.zones.iter().filter(move |zone| zone.kind() == kind)
    }

    pub fn get(&self, id: &ZoneId) -> Option<&GeofenceZone> {
        self.zones.iter().find(|zone| zone.id() == id)
    }

    pub fn contains(&self, id: &ZoneId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn count(&self, kind: ZoneKind) -> usize {
        self.iter(kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn add(&mut self, zone: GeofenceZone) -> ScResult<()> {
        if self.contains(zone.id()) {
            return Err(ScError::new(
                ErrorCode::DuplicateId,
                format!("zone {} already exists", zone.id()),
            ));
        }
        self.attach(&zone);
        debug!(zone = %zone.id(), kind = %zone.kind(), "zone added");
        self.zones.push(zone);
        Ok(())
    }

    pub fn remove(&mut self, id: &ZoneId) -> ScResult<GeofenceZone> {
        let Some(index) = self.zones.iter().position(|zone| zone.id() == id) else {
            return Err(ScError::new(
                ErrorCode::NotFound,
                format!("zone {} not found", id),
            ));
        };
        let zone = self.zones.remove(index);
        self.renderer.detach(zone.id());
        debug!(zone = %zone.id(), kind = %zone.kind(), "zone removed");
        Ok(zone)
    }

    /// Swaps every zone of `kind` for `zones`.
    ///
    /// All polygons of the old partition are detached before any new one is
    /// attached. Zones of the other kind, or whose id is already taken, are
    /// skipped and reported.
    pub fn replace_all(&mut self, kind: ZoneKind, zones: Vec<GeofenceZone>) -> ReplaceOutcome {
        let mut outcome = ReplaceOutcome::default();

        let (old, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.zones)
            .into_iter()
            .partition(|zone| zone.kind() == kind);
        self.zones = kept;
        for zone in &old {
            self.renderer.detach(zone.id());
        }
        outcome.detached = old.len();

        for zone in zones {
            if zone.kind() != kind {
                warn!(zone = %zone.id(), expected = %kind, "zone of wrong kind in snapshot");
                outcome.skipped.push(ScError::new(
                    ErrorCode::InvalidInput,
                    format!("zone {} is not a {} zone", zone.id(), kind),
                ));
                continue;
            }
            if let Err(err) = self.add(zone) {
                warn!(error = %err, "zone skipped during replace");
                outcome.skipped.push(err);
                continue;
            }
            outcome.attached += 1;
        }

        debug!(
            kind = %kind,
            detached = outcome.detached,
            attached = outcome.attached,
            "zones replaced"
        );
        outcome
    }

    /// Changes a zone's radius and redraws it.
    pub fn update_radius(&mut self, id: &ZoneId, radius_m: f64) -> ScResult<()> {
        let Some(zone) = self.zones.iter_mut().find(|zone| zone.id() == id) else {
            return Err(ScError::new(
                ErrorCode::NotFound,
                format!("zone {} not found", id),
            ));
        };
        zone.set_radius(radius_m)?;
        let zone = zone.clone();
        self.renderer.detach(zone.id());
        self.attach(&zone);
        Ok(())
    }

    pub fn clear(&mut self) {
        for zone in self.zones.drain(..) {
            self.renderer.detach(zone.id());
        }
    }

    fn attach(&self, zone: &GeofenceZone) {
        match ZonePolygon::for_zone(zone, self.polygon_steps) {
            Ok(polygon) => self.renderer.attach(&polygon),
            Err(err) => warn!(zone = %zone.id(), error = %err, "zone polygon not rendered"),
        }
    }
}
