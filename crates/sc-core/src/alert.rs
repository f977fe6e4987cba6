use crate::error::ScResult;
use crate::ids::ZoneId;
use crate::time::{now_epoch_millis, EpochMillis};
use crate::zone::GeofenceZone;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const HAZARD_ALERT_TITLE: &str = "⚠️ Hazard near your zone";

/// A (watch, hazard) pair, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlapPair {
    pub watch_id: ZoneId,
    pub hazard_id: ZoneId,
}

impl OverlapPair {
    pub fn new(watch_id: ZoneId, hazard_id: ZoneId) -> Self {
        Self {
            watch_id,
            hazard_id,
        }
    }

    /// Identifier handed to the notification channel for its own dedup.
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.watch_id, self.hazard_id)
    }
}

impl fmt::Display for OverlapPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.watch_id, self.hazard_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAlert {
    pub pair: OverlapPair,
    pub title: String,
    pub message: String,
    pub raised_at_ms: EpochMillis,
}

impl ZoneAlert {
    pub fn for_overlap(watch: &GeofenceZone, hazard: &GeofenceZone) -> Self {
        let watch_name = if watch.label().is_empty() {
            watch.id().as_str()
        } else {
            watch.label()
        };
        let message = if hazard.label().is_empty() {
            format!("A disaster area overlaps your '{}' zone.", watch_name)
        } else {
            format!(
                "{} hazard overlaps your '{}' zone.",
                hazard.label(),
                watch_name
            )
        };

        Self {
            pair: OverlapPair::new(watch.id().clone(), hazard.id().clone()),
            title: HAZARD_ALERT_TITLE.to_string(),
            message,
            raised_at_ms: now_epoch_millis(),
        }
    }

    pub fn dedup_key(&self) -> String {
        self.pair.dedup_key()
    }
}

/// The notification channel. Delivery is best effort; an error is reported
/// back but never undoes the state that produced the alert.
pub trait AlertSink: Send + Sync {
    fn dispatch(&self, alert: &ZoneAlert) -> ScResult<()>;
}
