//! Remote List Projector
//!
//! Consumes collection snapshots from the record database and materializes
//! the shared part list the rest of the app reads. Every notification
//! replaces the list wholesale; there is no incremental diffing.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::Part;
use crate::repository::{CollectionEvent, PartRepository};

/// Shared read-model of the parts collection
///
/// Written only by the projector task; every other component reads.
#[derive(Default)]
pub struct PartList {
    parts: RwLock<Vec<Part>>,
    error: RwLock<Option<String>>,
}

impl PartList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full projected list, in store key order.
    pub async fn parts(&self) -> Vec<Part> {
        self.parts.read().await.clone()
    }

    /// The list narrowed by `query`, per [`filter_parts`].
    pub async fn visible(&self, query: &str) -> Vec<Part> {
        filter_parts(&self.parts.read().await, query)
    }

    /// Message from a cancelled subscription, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.error.read().await.clone()
    }

    async fn replace(&self, parts: Vec<Part>) {
        *self.parts.write().await = parts;
    }

    async fn set_error(&self, message: String) {
        *self.error.write().await = Some(message);
    }
}

/// Drives a [`PartList`] from a repository subscription.
pub struct ListProjector;

impl ListProjector {
    /// Spawn the projection task. It runs until the event channel closes or
    /// the backend cancels the subscription; cancellation is surfaced on
    /// the list and not retried.
    pub async fn spawn(
        repo: Arc<dyn PartRepository>,
        list: Arc<PartList>,
    ) -> JoinHandle<()> {
        let mut events = repo.subscribe().await;
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    CollectionEvent::Snapshot(children) => {
                        list.replace(project_children(children)).await;
                    }
                    CollectionEvent::Cancelled(message) => {
                        warn!("parts subscription cancelled: {}", message);
                        list.set_error(message).await;
                        break;
                    }
                }
            }
        })
    }
}

/// Case-insensitive substring filter on the part name. A blank query
/// returns the list unchanged; order is always preserved.
pub fn filter_parts(parts: &[Part], query: &str) -> Vec<Part> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return parts.to_vec();
    }
    parts
        .iter()
        .filter(|part| part.part_name.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Deserialize snapshot children into parts, dropping any that no longer
/// parse. Dropped records are logged, never surfaced.
fn project_children(children: Vec<serde_json::Value>) -> Vec<Part> {
    let mut parts = Vec::with_capacity(children.len());
    for child in children {
        match serde_json::from_value::<Part>(child) {
            Ok(part) => parts.push(part),
            Err(e) => debug!("dropping undeserializable part record: {}", e),
        }
    }
    parts
}
