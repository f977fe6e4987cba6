pub mod alert;
pub mod error;
pub mod ids;
pub mod record;
pub mod time;
pub mod zone;

pub use alert::{AlertSink, OverlapPair, ZoneAlert, HAZARD_ALERT_TITLE};
pub use error::{ErrorCode, ScError, ScResult};
pub use ids::{CorrelationId, MessageId, UserId, ZoneId};
pub use record::{parse_zone_batch, ZoneBatch, ZoneRecord};
pub use time::{next_time_token, now_epoch_millis, EpochMillis};
pub use zone::{
    GeofenceZone, ZoneKind, ZoneStyle, DEFAULT_FILL_COLOR, DEFAULT_STROKE_COLOR,
    DEFAULT_STROKE_WIDTH_PX, HAZARD_FILL_COLOR, HAZARD_STROKE_COLOR, SELF_ZONE_LABEL,
};

pub use sc_geo::GeoPoint;
