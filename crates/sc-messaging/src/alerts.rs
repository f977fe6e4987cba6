use crate::{MessageEnvelope, MessageMetadata, MessagingError, ZmqPublisher};
use sc_core::{
    now_epoch_millis, AlertSink, ErrorCode, MessageId, ScError, ScResult, UserId, ZoneAlert,
};
use std::sync::Mutex;

pub const ALERT_TOPIC: &str = "zones.alert";

pub fn alert_envelope(
    alert: &ZoneAlert,
    user_id: UserId,
    source_service: &str,
) -> MessageEnvelope<ZoneAlert> {
    let metadata = MessageMetadata::new(
        MessageId::new(),
        user_id,
        now_epoch_millis(),
        source_service.to_string(),
    )
    .with_dedup_key(alert.dedup_key());
    MessageEnvelope {
        metadata,
        payload: alert.clone(),
    }
}

/// Publishes hazard alerts for one user on [`ALERT_TOPIC`].
pub struct ZmqAlertSink {
    publisher: Mutex<ZmqPublisher>,
    user_id: UserId,
    source_service: String,
}

impl ZmqAlertSink {
    pub fn new(publisher: ZmqPublisher, user_id: UserId, source_service: impl Into<String>) -> Self {
        Self {
            publisher: Mutex::new(publisher),
            user_id,
            source_service: source_service.into(),
        }
    }

    fn publish(&self, alert: &ZoneAlert) -> Result<(), MessagingError> {
        let envelope = alert_envelope(alert, self.user_id, &self.source_service);
        let publisher = self.publisher.lock().map_err(|_| MessagingError::Poisoned)?;
        publisher.publish(ALERT_TOPIC, &envelope)
    }
}

impl AlertSink for ZmqAlertSink {
    fn dispatch(&self, alert: &ZoneAlert) -> ScResult<()> {
        self.publish(alert).map_err(|err| {
            ScError::new(
                ErrorCode::Upstream,
                format!("alert {} not published: {}", alert.dedup_key(), err),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{GeoPoint, GeofenceZone, ZoneKind};

    fn alert() -> ZoneAlert {
        let center = GeoPoint::new(14.5646, 120.9930).unwrap();
        let watch = GeofenceZone::new("w1".into(), center, 500.0, ZoneKind::Watch)
            .unwrap()
            .with_label("Home");
        let hazard = GeofenceZone::new("h1".into(), center, 100.0, ZoneKind::Hazard).unwrap();
        ZoneAlert::for_overlap(&watch, &hazard)
    }

    #[test]
    fn envelope_carries_dedup_key_and_user() {
        let user = UserId::new();
        let envelope = alert_envelope(&alert(), user, "sc-worker");
        assert_eq!(envelope.metadata.user_id, user);
        assert_eq!(envelope.metadata.dedup_key.as_deref(), Some("w1|h1"));
        assert_eq!(envelope.metadata.source_service, "sc-worker");
        assert!(envelope.metadata.correlation_id.is_none());
        assert_eq!(
            envelope.payload.message,
            "A disaster area overlaps your 'Home' zone."
        );
    }

    #[test]
    fn envelope_serializes_with_metadata_first() {
        let envelope = alert_envelope(&alert(), UserId::new(), "sc-worker");
        let json = serde_json::to_value(&envelope).unwrap();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["metadata", "payload"]);
        assert_eq!(json["payload"]["pair"]["hazard_id"], "h1");
    }

    #[test]
    fn each_envelope_gets_its_own_message_id() {
        let alert = alert();
        let first = alert_envelope(&alert, UserId::new(), "sc-worker");
        let second = alert_envelope(&alert, UserId::new(), "sc-worker");
        assert_ne!(first.metadata.message_id, second.metadata.message_id);
    }
}
