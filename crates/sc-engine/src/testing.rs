use crate::render::{RenderSink, ZonePolygon};
use sc_core::{
    AlertSink, ErrorCode, GeoPoint, GeofenceZone, ScError, ScResult, ZoneAlert, ZoneId, ZoneKind,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub const LNG: f64 = 120.9930;

pub fn watch(id: &str, lat: f64, radius_m: f64) -> GeofenceZone {
    GeofenceZone::new(id.into(), GeoPoint::new(lat, LNG).unwrap(), radius_m, ZoneKind::Watch)
        .unwrap()
        .with_label(format!("{id} area"))
}

pub fn hazard(id: &str, lat: f64, radius_m: f64) -> GeofenceZone {
    GeofenceZone::new(id.into(), GeoPoint::new(lat, LNG).unwrap(), radius_m, ZoneKind::Hazard)
        .unwrap()
        .with_label("Fire")
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Attach(ZonePolygon),
    Detach(ZoneId),
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl RenderSink for RecordingRenderer {
    fn attach(&self, polygon: &ZonePolygon) {
        self.calls
            .lock()
            .unwrap()
            .push(RenderCall::Attach(polygon.clone()));
    }

    fn detach(&self, zone_id: &ZoneId) {
        self.calls
            .lock()
            .unwrap()
            .push(RenderCall::Detach(zone_id.clone()));
    }
}

#[derive(Debug, Default)]
pub struct RecordingAlerts {
    alerts: Mutex<Vec<ZoneAlert>>,
    failing: AtomicBool,
}

impl RecordingAlerts {
    pub fn alerts(&self) -> Vec<ZoneAlert> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl AlertSink for RecordingAlerts {
    fn dispatch(&self, alert: &ZoneAlert) -> ScResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ScError::new(ErrorCode::Upstream, "notifier offline"));
        }
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }
}
