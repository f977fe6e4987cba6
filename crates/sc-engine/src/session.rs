use crate::render::RenderSink;
use crate::store::{ReplaceOutcome, ZoneStore};
use crate::tracker::OverlapTracker;
use sc_config::EngineConfig;
use sc_core::{
    parse_zone_batch, AlertSink, ErrorCode, GeoPoint, GeofenceZone, OverlapPair, ScError,
    ScResult, ZoneId, ZoneKind,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct SnapshotOutcome {
    pub replace: ReplaceOutcome,
    pub notified: Vec<OverlapPair>,
}

#[derive(Debug, Default)]
pub struct DocumentOutcome {
    pub watch: ReplaceOutcome,
    pub hazard: ReplaceOutcome,
    pub notified: Vec<OverlapPair>,
    pub rejected: Vec<ScError>,
}

impl DocumentOutcome {
    pub fn attached(&self) -> usize {
        self.watch.attached + self.hazard.attached
    }
}

/// One user's zones plus the alert state that goes with them.
///
/// Every mutation is followed by exactly one overlap evaluation.
pub struct ZoneSession {
    store: ZoneStore,
    tracker: OverlapTracker,
    alerts: Arc<dyn AlertSink>,
    default_radius_m: f64,
    self_zone_radius_m: f64,
}

impl ZoneSession {
    pub fn new(
        config: &EngineConfig,
        renderer: Arc<dyn RenderSink>,
        alerts: Arc<dyn AlertSink>,
    ) -> ScResult<Self> {
        Ok(Self {
            store: ZoneStore::new(renderer, config.polygon_steps)?,
            tracker: OverlapTracker::new(),
            alerts,
            default_radius_m: config.default_radius_m,
            self_zone_radius_m: config.self_zone_radius_m,
        })
    }

    pub fn store(&self) -> &ZoneStore {
        &self.store
    }

    pub fn tracker(&self) -> &OverlapTracker {
        &self.tracker
    }

    pub fn zones(&self, kind: ZoneKind) -> Vec<GeofenceZone> {
        self.store.all(kind)
    }

    pub fn evaluate(&mut self) -> Vec<OverlapPair> {
        let watch = self.store.all(ZoneKind::Watch);
        let hazards = self.store.all(ZoneKind::Hazard);
        self.tracker.evaluate(&watch, &hazards, self.alerts.as_ref())
    }

    /// Treats `zones` as the complete current set for `kind`.
    pub fn apply_snapshot(&mut self, kind: ZoneKind, zones: Vec<GeofenceZone>) -> SnapshotOutcome {
        let replace = self.replace_partition(kind, zones);
        let notified = self.evaluate();
        SnapshotOutcome { replace, notified }
    }

    /// Applies a whole stored document as the complete current state. Both
    /// partitions are replaced before the one evaluation.
    pub fn apply_document(&mut self, records: &[Value]) -> DocumentOutcome {
        let batch = parse_zone_batch(records);
        for err in &batch.rejected {
            warn!(error = %err, "zone record skipped");
        }
        metrics::counter!("sc_zone_records_rejected_total").increment(batch.rejected.len() as u64);

        let (hazards, watch): (Vec<_>, Vec<_>) =
            batch.zones.into_iter().partition(GeofenceZone::is_hazard);
        let watch = self.replace_partition(ZoneKind::Watch, watch);
        let hazard = self.replace_partition(ZoneKind::Hazard, hazards);
        let notified = self.evaluate();
        DocumentOutcome {
            watch,
            hazard,
            notified,
            rejected: batch.rejected,
        }
    }

    fn replace_partition(&mut self, kind: ZoneKind, zones: Vec<GeofenceZone>) -> ReplaceOutcome {
        let replace = self.store.replace_all(kind, zones);
        metrics::counter!("sc_zone_snapshots_applied_total", "kind" => kind.as_str()).increment(1);
        self.record_gauges();
        replace
    }

    pub fn add_zone(&mut self, zone: GeofenceZone) -> ScResult<Vec<OverlapPair>> {
        self.store.add(zone)?;
        self.record_gauges();
        Ok(self.evaluate())
    }

    /// Tap-to-place: builds a zone with a fresh id and the kind's default
    /// style, then adds it.
    pub fn place_zone(
        &mut self,
        center: GeoPoint,
        radius_m: Option<f64>,
        kind: ZoneKind,
        label: impl Into<String>,
    ) -> ScResult<GeofenceZone> {
        let radius_m = radius_m.unwrap_or(self.default_radius_m);
        let zone = GeofenceZone::new(ZoneId::generate(), center, radius_m, kind)?.with_label(label);
        self.add_zone(zone.clone())?;
        info!(zone = %zone.id(), kind = %kind, radius_m, "zone placed");
        Ok(zone)
    }

    pub fn remove_zone(&mut self, id: &ZoneId) -> ScResult<GeofenceZone> {
        let zone = self.store.remove(id)?;
        self.record_gauges();
        self.evaluate();
        Ok(zone)
    }

    pub fn update_radius(&mut self, id: &ZoneId, radius_m: f64) -> ScResult<Vec<OverlapPair>> {
        self.store.update_radius(id, radius_m)?;
        Ok(self.evaluate())
    }

    /// Seeds the "You" watch zone when the session holds no zones at all.
    pub fn bootstrap_self_zone(&mut self, center: GeoPoint) -> ScResult<Option<GeofenceZone>> {
        if !self.store.is_empty() {
            return Ok(None);
        }
        let zone = GeofenceZone::self_zone(center, self.self_zone_radius_m)?;
        self.add_zone(zone.clone())?;
        info!(zone = %zone.id(), "self zone seeded");
        Ok(Some(zone))
    }

    pub fn reset_alerts(&mut self) {
        self.tracker.reset();
    }

    fn record_gauges(&self) {
        for kind in [ZoneKind::Watch, ZoneKind::Hazard] {
            metrics::gauge!("sc_zones", "kind" => kind.as_str()).set(self.store.count(kind) as f64);
        }
    }
}

type Reply<T> = oneshot::Sender<T>;

enum Command {
    ApplyDocument {
        records: Vec<Value>,
        reply: Reply<DocumentOutcome>,
    },
    ApplySnapshot {
        kind: ZoneKind,
        zones: Vec<GeofenceZone>,
        reply: Reply<SnapshotOutcome>,
    },
    Add {
        zone: GeofenceZone,
        reply: Reply<ScResult<Vec<OverlapPair>>>,
    },
    Place {
        center: GeoPoint,
        radius_m: Option<f64>,
        kind: ZoneKind,
        label: String,
        reply: Reply<ScResult<GeofenceZone>>,
    },
    Remove {
        id: ZoneId,
        reply: Reply<ScResult<GeofenceZone>>,
    },
    UpdateRadius {
        id: ZoneId,
        radius_m: f64,
        reply: Reply<ScResult<Vec<OverlapPair>>>,
    },
    Bootstrap {
        center: GeoPoint,
        reply: Reply<ScResult<Option<GeofenceZone>>>,
    },
    Zones {
        kind: ZoneKind,
        reply: Reply<Vec<GeofenceZone>>,
    },
    ResetAlerts,
}

/// Cloneable front for a session running on its own task.
///
/// Commands from every handle go through one queue and are applied strictly
/// in arrival order, one at a time. Nothing queued is dropped, so when two
/// snapshots of the same kind race the later one is what the store ends up
/// holding.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    /// Starts the session task. The task ends, handing the session back,
    /// once every handle has been dropped.
    pub fn spawn(session: ZoneSession) -> (Self, JoinHandle<ZoneSession>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(session, rx));
        (Self { tx }, task)
    }

    pub async fn apply_document(&self, records: Vec<Value>) -> ScResult<DocumentOutcome> {
        self.request(|reply| Command::ApplyDocument { records, reply })
            .await
    }

    pub async fn apply_snapshot(
        &self,
        kind: ZoneKind,
        zones: Vec<GeofenceZone>,
    ) -> ScResult<SnapshotOutcome> {
        self.request(|reply| Command::ApplySnapshot { kind, zones, reply })
            .await
    }

    pub async fn add_zone(&self, zone: GeofenceZone) -> ScResult<Vec<OverlapPair>> {
        self.request(|reply| Command::Add { zone, reply }).await?
    }

    pub async fn place_zone(
        &self,
        center: GeoPoint,
        radius_m: Option<f64>,
        kind: ZoneKind,
        label: impl Into<String>,
    ) -> ScResult<GeofenceZone> {
        let label = label.into();
        self.request(|reply| Command::Place {
            center,
            radius_m,
            kind,
            label,
            reply,
        })
        .await?
    }

    pub async fn remove_zone(&self, id: ZoneId) -> ScResult<GeofenceZone> {
        self.request(|reply| Command::Remove { id, reply }).await?
    }

    pub async fn update_radius(&self, id: ZoneId, radius_m: f64) -> ScResult<Vec<OverlapPair>> {
        self.request(|reply| Command::UpdateRadius {
            id,
            radius_m,
            reply,
        })
        .await?
    }

    pub async fn bootstrap_self_zone(&self, center: GeoPoint) -> ScResult<Option<GeofenceZone>> {
        self.request(|reply| Command::Bootstrap { center, reply })
            .await?
    }

    pub async fn zones(&self, kind: ZoneKind) -> ScResult<Vec<GeofenceZone>> {
        self.request(|reply| Command::Zones { kind, reply }).await
    }

    pub fn reset_alerts(&self) -> ScResult<()> {
        self.tx.send(Command::ResetAlerts).map_err(|_| stopped())
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> ScResult<T> {
        let (reply, response) = oneshot::channel();
        self.tx.send(build(reply)).map_err(|_| stopped())?;
        response.await.map_err(|_| stopped())
    }
}

fn stopped() -> ScError {
    ScError::new(ErrorCode::Unavailable, "zone session stopped")
}

async fn run(mut session: ZoneSession, mut rx: mpsc::UnboundedReceiver<Command>) -> ZoneSession {
    while let Some(command) = rx.recv().await {
        session.handle(command);
    }
    debug!("zone session stopped");
    session
}

impl ZoneSession {
    // A dropped reply receiver just means the caller stopped waiting; the
    // mutation has already happened.
    fn handle(&mut self, command: Command) {
        match command {
            Command::ApplyDocument { records, reply } => {
                let _ = reply.send(self.apply_document(&records));
            }
            Command::ApplySnapshot { kind, zones, reply } => {
                let _ = reply.send(self.apply_snapshot(kind, zones));
            }
            Command::Add { zone, reply } => {
                let _ = reply.send(self.add_zone(zone));
            }
            Command::Place {
                center,
                radius_m,
                kind,
                label,
                reply,
            } => {
                let _ = reply.send(self.place_zone(center, radius_m, kind, label));
            }
            Command::Remove { id, reply } => {
                let _ = reply.send(self.remove_zone(&id));
            }
            Command::UpdateRadius {
                id,
                radius_m,
                reply,
            } => {
                let _ = reply.send(self.update_radius(&id, radius_m));
            }
            Command::Bootstrap { center, reply } => {
                let _ = reply.send(self.bootstrap_self_zone(center));
            }
            Command::Zones { kind, reply } => {
                let _ = reply.send(self.zones(kind));
            }
            Command::ResetAlerts => self.reset_alerts(),
        }
    }
}
