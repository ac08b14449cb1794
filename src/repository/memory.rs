//! In-Memory Collaborators
//!
//! Map-backed implementations of the collaborator traits, used by tests and
//! local development. Records are kept as raw JSON so the store can hold
//! entries the `Part` type no longer (or never did) understand, and the
//! fakes expose small fault-injection hooks for exercising failure paths.

use std::collections::{BTreeMap, HashSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use super::traits::{
    CaptureDevice, CapturedImage, CollectionEvent, ImageStore, PartRepository, SpeechEvent,
    SpeechSource,
};
use crate::domain::{DomainError, DomainResult, Entity, Part};

/// In-memory record database with snapshot subscriptions
pub struct MemoryPartRepository {
    records: Mutex<BTreeMap<String, serde_json::Value>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<CollectionEvent>>>,
    fail_next: Mutex<Option<String>>,
    hang_next: Mutex<bool>,
}

impl MemoryPartRepository {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            subscribers: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
            hang_next: Mutex::new(false),
        }
    }

    pub async fn record_count(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Insert a raw record without going through `create`. Lets tests seed
    /// legacy or malformed entries.
    pub async fn insert_raw(&self, id: &str, value: serde_json::Value) {
        self.records.lock().await.insert(id.to_string(), value);
        self.notify().await;
    }

    /// Fail the next mutating call with `message`.
    pub async fn fail_next(&self, message: &str) {
        *self.fail_next.lock().await = Some(message.to_string());
    }

    /// Make the next mutating call never return.
    pub async fn hang_next(&self) {
        *self.hang_next.lock().await = true;
    }

    /// Simulate the backend cancelling every active subscription.
    pub async fn cancel_subscriptions(&self, message: &str) {
        let mut subscribers = self.subscribers.lock().await;
        for tx in subscribers.drain(..) {
            let _ = tx.send(CollectionEvent::Cancelled(message.to_string()));
        }
    }

    async fn take_fault(&self) -> DomainResult<()> {
        let hang = {
            let mut guard = self.hang_next.lock().await;
            std::mem::take(&mut *guard)
        };
        if hang {
            std::future::pending::<()>().await;
        }
        if let Some(message) = self.fail_next.lock().await.take() {
            return Err(DomainError::Database(message));
        }
        Ok(())
    }

    async fn snapshot(&self) -> Vec<serde_json::Value> {
        self.records.lock().await.values().cloned().collect()
    }

    /// Push the current collection state to every live subscriber.
    async fn notify(&self) {
        let snapshot = self.snapshot().await;
        let mut subscribers = self.subscribers.lock().await;
        subscribers.retain(|tx| tx.send(CollectionEvent::Snapshot(snapshot.clone())).is_ok());
    }
}

impl Default for MemoryPartRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PartRepository for MemoryPartRepository {
    async fn create(&self, part: &Part) -> DomainResult<Part> {
        self.take_fault().await?;
        let mut stored = part.clone();
        stored.id = Uuid::new_v4().simple().to_string();
        let value = serde_json::to_value(&stored)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        self.records.lock().await.insert(stored.id(), value);
        self.notify().await;
        Ok(stored)
    }

    async fn replace(&self, id: &str, part: &Part) -> DomainResult<()> {
        self.take_fault().await?;
        let value = serde_json::to_value(part)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        self.records.lock().await.insert(id.to_string(), value);
        self.notify().await;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Part>> {
        let value = self.records.lock().await.get(id).cloned();
        match value {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| DomainError::Database(e.to_string())),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.take_fault().await?;
        self.records.lock().await.remove(id);
        self.notify().await;
        Ok(())
    }

    async fn subscribe(&self) -> mpsc::UnboundedReceiver<CollectionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        // prime the new subscriber with the current state
        let _ = tx.send(CollectionEvent::Snapshot(self.snapshot().await));
        self.subscribers.lock().await.push(tx);
        rx
    }
}

/// In-memory blob store with `memory://` URLs
pub struct MemoryImageStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_uploads: Mutex<HashSet<String>>,
    fail_deletes: Mutex<HashSet<String>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            fail_uploads: Mutex::new(HashSet::new()),
            fail_deletes: Mutex::new(HashSet::new()),
        }
    }

    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn contains(&self, object_key: &str) -> bool {
        self.objects.lock().await.contains_key(object_key)
    }

    /// Reject the upload of a specific object key.
    pub async fn fail_upload_of(&self, object_key: &str) {
        self.fail_uploads.lock().await.insert(object_key.to_string());
    }

    /// Reject the deletion of a specific URL.
    pub async fn fail_delete_of(&self, url: &str) {
        self.fail_deletes.lock().await.insert(url.to_string());
    }

    fn key_of(url: &str) -> &str {
        url.strip_prefix("memory://").unwrap_or(url)
    }
}

impl Default for MemoryImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(&self, bytes: Vec<u8>, object_key: &str) -> DomainResult<String> {
        if self.fail_uploads.lock().await.contains(object_key) {
            return Err(DomainError::Storage(format!(
                "upload rejected for {}",
                object_key
            )));
        }
        self.objects
            .lock()
            .await
            .insert(object_key.to_string(), bytes);
        Ok(format!("memory://{}", object_key))
    }

    async fn delete(&self, url: &str) -> DomainResult<()> {
        if self.fail_deletes.lock().await.contains(url) {
            return Err(DomainError::Storage(format!("delete rejected for {}", url)));
        }
        self.objects.lock().await.remove(Self::key_of(url));
        Ok(())
    }
}

/// Capture device that serves results from a fixed queue
///
/// Each queued entry answers one `capture` call; an empty queue means the
/// camera flow was dismissed.
pub struct ScriptedCaptureDevice {
    queue: Mutex<VecDeque<DomainResult<CapturedImage>>>,
}

impl ScriptedCaptureDevice {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub async fn push_capture(&self, path: impl Into<std::path::PathBuf>) {
        self.queue
            .lock()
            .await
            .push_back(Ok(CapturedImage { path: path.into() }));
    }

    pub async fn push_error(&self, message: &str) {
        self.queue
            .lock()
            .await
            .push_back(Err(DomainError::Capture(message.to_string())));
    }
}

impl Default for ScriptedCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureDevice for ScriptedCaptureDevice {
    async fn capture(&self) -> DomainResult<CapturedImage> {
        self.queue
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::Capture("capture dismissed".to_string())))
    }
}

/// Speech source that replays a fixed list of events
pub struct ScriptedSpeechSource {
    events: Mutex<Vec<SpeechEvent>>,
}

impl ScriptedSpeechSource {
    pub fn new(events: Vec<SpeechEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }
}

#[async_trait]
impl SpeechSource for ScriptedSpeechSource {
    async fn start_listening(&self) -> DomainResult<mpsc::UnboundedReceiver<SpeechEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in self.events.lock().await.drain(..) {
            let _ = tx.send(event);
        }
        Ok(rx)
    }

    fn stop(&self) {}
}
