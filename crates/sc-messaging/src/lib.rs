use sc_core::{CorrelationId, EpochMillis, MessageId, UserId};
use serde::{Deserialize, Serialize};

mod alerts;
mod zmq_transport;
pub use alerts::{alert_envelope, ZmqAlertSink, ALERT_TOPIC};
pub use zmq_transport::{MessagingError, ZmqPublisher, ZmqPublisherConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub message_id: MessageId,
    pub correlation_id: Option<CorrelationId>,
    pub user_id: UserId,
    pub sent_at_ms: EpochMillis,
    pub source_service: String,
    /// Receivers drop a message whose key they have already shown.
    pub dedup_key: Option<String>,
}

impl MessageMetadata {
    pub fn new(
        message_id: MessageId,
        user_id: UserId,
        sent_at_ms: EpochMillis,
        source_service: String,
    ) -> Self {
        Self {
            message_id,
            correlation_id: None,
            user_id,
            sent_at_ms,
            source_service,
            dedup_key: None,
        }
    }

    pub fn with_dedup_key(mut self, key: impl Into<String>) -> Self {
        self.dedup_key = Some(key.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope<T> {
    pub metadata: MessageMetadata,
    pub payload: T,
}
