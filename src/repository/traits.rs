//! Repository Layer - Collaborator Traits
//!
//! Abstract interfaces for the services the core talks to: the remote
//! record database, the image blob store, and the two device sources
//! (camera capture, speech). Implementations can be in-memory, REST, etc.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{DomainResult, Part};

/// One notification from the record database subscription.
#[derive(Debug, Clone)]
pub enum CollectionEvent {
    /// Full snapshot of every record in the collection, in key order.
    /// Children are raw JSON; consumers decide what still deserializes.
    Snapshot(Vec<serde_json::Value>),
    /// The backend cancelled the subscription. Terminal, no retry.
    Cancelled(String),
}

/// Record database for parts
///
/// Backed by a cloud store with a flat `parts/{id}` layout. Mutations
/// always round-trip through the store; the local list is only ever fed
/// by `subscribe` snapshots.
#[async_trait]
pub trait PartRepository: Send + Sync {
    /// Persist a new part; the store assigns the key. Returns the part
    /// with its id filled in.
    async fn create(&self, part: &Part) -> DomainResult<Part>;

    /// Replace the record at `id` wholesale.
    async fn replace(&self, id: &str, part: &Part) -> DomainResult<()>;

    /// Fetch a single record, or `None` if it does not exist.
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Part>>;

    /// Remove the record at `id`.
    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// Subscribe to collection changes. The current state arrives as the
    /// first event on the returned channel.
    async fn subscribe(&self) -> mpsc::UnboundedReceiver<CollectionEvent>;
}

/// Blob storage for part images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload `bytes` under `object_key`, returning the public URL.
    async fn upload(&self, bytes: Vec<u8>, object_key: &str) -> DomainResult<String>;

    /// Delete the object a previously returned URL points at.
    async fn delete(&self, url: &str) -> DomainResult<()>;
}

/// A locally captured image, written to app-private storage by the camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub path: PathBuf,
}

/// Camera capture flow (permission prompts included)
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Run one capture; resolves once the camera returns. Only one capture
    /// is ever awaited at a time per form.
    async fn capture(&self) -> DomainResult<CapturedImage>;
}

/// One event from the speech recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// A recognized text fragment for the remarks field
    Transcript(String),
    /// Recognizer error; listening may end after this
    Error(String),
}

/// Speech-to-text source feeding the remarks field
#[async_trait]
pub trait SpeechSource: Send + Sync {
    /// Begin listening; events arrive on the returned channel until `stop`
    /// is called or the recognizer gives up.
    async fn start_listening(&self) -> DomainResult<mpsc::UnboundedReceiver<SpeechEvent>>;

    /// Stop listening; the event channel closes.
    fn stop(&self);
}
