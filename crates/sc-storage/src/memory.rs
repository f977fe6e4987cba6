use crate::{StorageError, ZoneDocument, ZoneRepository, ZoneSubscription};
use async_trait::async_trait;
use sc_core::UserId;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;

/// In-process document store with live change notification.
#[derive(Debug, Default)]
pub struct MemoryZoneRepository {
    documents: Mutex<HashMap<UserId, watch::Sender<ZoneDocument>>>,
}

impl MemoryZoneRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(user_id: UserId, document: ZoneDocument) -> Self {
        let mut documents = HashMap::new();
        documents.insert(user_id, watch::channel(document).0);
        Self {
            documents: Mutex::new(documents),
        }
    }

    fn with_sender<T>(
        &self,
        user_id: UserId,
        f: impl FnOnce(&watch::Sender<ZoneDocument>) -> T,
    ) -> Result<T, StorageError> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| StorageError::new("zone repository lock poisoned"))?;
        let sender = documents
            .entry(user_id)
            .or_insert_with(|| watch::channel(ZoneDocument::default()).0);
        Ok(f(sender))
    }
}

#[async_trait]
impl ZoneRepository for MemoryZoneRepository {
    async fn load(&self, user_id: UserId) -> Result<ZoneDocument, StorageError> {
        self.with_sender(user_id, |sender| sender.borrow().clone())
    }

    async fn update(&self, user_id: UserId, document: ZoneDocument) -> Result<(), StorageError> {
        self.with_sender(user_id, |sender| {
            sender.send_replace(document);
        })
    }

    async fn subscribe(&self, user_id: UserId) -> Result<ZoneSubscription, StorageError> {
        self.with_sender(user_id, |sender| ZoneSubscription::new(sender.subscribe()))
    }
}
