use async_trait::async_trait;
use sc_core::{parse_zone_batch, ErrorCode, GeofenceZone, ScError, UserId, ZoneBatch, ZoneId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

mod memory;
pub use memory::MemoryZoneRepository;

#[derive(Debug, Clone)]
pub struct StorageError {
    pub code: ErrorCode,
    pub message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Unavailable,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::NotFound,
            message: message.into(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for ScError {
    fn from(value: StorageError) -> Self {
        ScError::new(value.code, value.message)
    }
}

/// One user's document: the raw zone records as the store holds them.
///
/// Records stay untyped here so a single bad entry never prevents the rest
/// of the document from loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneDocument {
    #[serde(rename = "savedCircles", default)]
    pub records: Vec<Value>,
}

impl ZoneDocument {
    pub fn from_zones<'a>(zones: impl IntoIterator<Item = &'a GeofenceZone>) -> Self {
        Self {
            records: zones
                .into_iter()
                .map(|zone| zone.to_record().to_value())
                .collect(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw)
            .map_err(|err| StorageError::new(format!("invalid zone document: {}", err)))
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| StorageError::new(format!("zone document encode failed: {}", err)))
    }

    pub fn parse(&self) -> ZoneBatch {
        parse_zone_batch(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Live view of a user's document. Always yields the newest version;
/// intermediate versions written while the consumer was busy collapse into
/// the latest one.
pub struct ZoneSubscription {
    receiver: tokio::sync::watch::Receiver<ZoneDocument>,
}

impl ZoneSubscription {
    pub fn new(receiver: tokio::sync::watch::Receiver<ZoneDocument>) -> Self {
        Self { receiver }
    }

    pub fn current(&mut self) -> ZoneDocument {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for the next change. `None` once the store side is gone.
    pub async fn changed(&mut self) -> Option<ZoneDocument> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

#[async_trait]
pub trait ZoneRepository: Send + Sync {
    async fn load(&self, user_id: UserId) -> Result<ZoneDocument, StorageError>;
    async fn update(&self, user_id: UserId, document: ZoneDocument) -> Result<(), StorageError>;
    async fn subscribe(&self, user_id: UserId) -> Result<ZoneSubscription, StorageError>;
}

/// Appends a zone to the user's document, replacing any record with the
/// same id.
pub async fn save_zone<R>(repo: &R, user_id: UserId, zone: &GeofenceZone) -> Result<(), StorageError>
where
    R: ZoneRepository + ?Sized,
{
    let mut document = repo.load(user_id).await?;
    document
        .records
        .retain(|record| record_id(record) != Some(zone.id().as_str()));
    document.records.push(zone.to_record().to_value());
    repo.update(user_id, document).await
}

pub async fn delete_zone<R>(repo: &R, user_id: UserId, id: &ZoneId) -> Result<(), StorageError>
where
    R: ZoneRepository + ?Sized,
{
    let mut document = repo.load(user_id).await?;
    let before = document.records.len();
    document
        .records
        .retain(|record| record_id(record) != Some(id.as_str()));
    if document.records.len() == before {
        return Err(StorageError::not_found(format!("zone {} not found", id)));
    }
    repo.update(user_id, document).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{GeoPoint, ZoneKind};
    use serde_json::json;

    fn zone(id: &str, radius: f64) -> GeofenceZone {
        GeofenceZone::new(
            id.into(),
            GeoPoint::new(14.5646, 120.9930).unwrap(),
            radius,
            ZoneKind::Watch,
        )
        .unwrap()
    }

    #[test]
    fn document_uses_saved_circles_field() {
        let document = ZoneDocument::from_zones(&[zone("a", 10.0)]);
        let raw = document.to_json().unwrap();
        assert!(raw.contains("\"savedCircles\""));
        assert_eq!(ZoneDocument::from_json(&raw).unwrap(), document);
    }

    #[test]
    fn missing_records_field_is_empty_document() {
        let document = ZoneDocument::from_json("{}").unwrap();
        assert!(document.is_empty());
        assert!(ZoneDocument::from_json("[").is_err());
    }

    #[test]
    fn parse_keeps_valid_records() {
        let document = ZoneDocument {
            records: vec![
                zone("a", 10.0).to_record().to_value(),
                json!({"id": "broken"}),
            ],
        };
        let batch = document.parse();
        assert_eq!(batch.zones.len(), 1);
        assert_eq!(batch.rejected.len(), 1);
    }

    #[tokio::test]
    async fn save_zone_replaces_same_id() {
        let repo = MemoryZoneRepository::new();
        let user = UserId::new();
        save_zone(&repo, user, &zone("a", 10.0)).await.unwrap();
        save_zone(&repo, user, &zone("b", 20.0)).await.unwrap();
        save_zone(&repo, user, &zone("a", 30.0)).await.unwrap();

        let batch = repo.load(user).await.unwrap().parse();
        let radii: Vec<(String, f64)> = batch
            .zones
            .iter()
            .map(|zone| (zone.id().to_string(), zone.radius_m()))
            .collect();
        assert_eq!(radii, vec![("b".to_string(), 20.0), ("a".to_string(), 30.0)]);
    }

    #[tokio::test]
    async fn delete_zone_reports_missing_id() {
        let repo = MemoryZoneRepository::new();
        let user = UserId::new();
        save_zone(&repo, user, &zone("a", 10.0)).await.unwrap();

        let err = delete_zone(&repo, user, &ZoneId::new("zzz")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        delete_zone(&repo, user, &ZoneId::new("a")).await.unwrap();
        assert!(repo.load(user).await.unwrap().is_empty());
    }
}
