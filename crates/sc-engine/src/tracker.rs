use sc_core::{AlertSink, GeofenceZone, OverlapPair, ZoneAlert, ZoneId};
use std::collections::HashSet;
use tracing::{info, warn};

/// Remembers which (watch, hazard) pairs have already been alerted.
///
/// A pair moves from unseen to notified the first time it is evaluated while
/// overlapping and stays notified for the life of the tracker, even if the
/// zones drift apart or are deleted.
#[derive(Debug, Default)]
pub struct OverlapTracker {
    notified: HashSet<OverlapPair>,
}

impl OverlapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every watch × hazard pair in the order given and alerts each
    /// newly overlapping pair once. Returns the pairs that were notified by
    /// this call.
    ///
    /// A failed dispatch is logged; the pair still counts as notified.
    pub fn evaluate(
        &mut self,
        watch: &[GeofenceZone],
        hazards: &[GeofenceZone],
        sink: &dyn AlertSink,
    ) -> Vec<OverlapPair> {
        let mut fresh = Vec::new();
        for watch_zone in watch {
            for hazard_zone in hazards {
                let pair = OverlapPair::new(watch_zone.id().clone(), hazard_zone.id().clone());
                if self.notified.contains(&pair) || !watch_zone.overlaps(hazard_zone) {
                    continue;
                }
                self.notified.insert(pair.clone());

                let alert = ZoneAlert::for_overlap(watch_zone, hazard_zone);
                match sink.dispatch(&alert) {
                    Ok(()) => {
                        metrics::counter!("sc_zone_alerts_total").increment(1);
                        info!(pair = %pair, message = %alert.message, "hazard overlap alerted");
                    }
                    Err(err) => {
                        metrics::counter!("sc_zone_alert_failures_total").increment(1);
                        warn!(pair = %pair, error = %err, "hazard alert dispatch failed");
                    }
                }
                fresh.push(pair);
            }
        }
        fresh
    }

    pub fn is_notified(&self, watch_id: &ZoneId, hazard_id: &ZoneId) -> bool {
        self.notified
            .contains(&OverlapPair::new(watch_id.clone(), hazard_id.clone()))
    }

    pub fn len(&self) -> usize {
        self.notified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notified.is_empty()
    }

    pub fn reset(&mut self) {
        self.notified.clear();
    }
}
