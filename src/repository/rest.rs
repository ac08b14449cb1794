//! REST Collaborators
//!
//! `reqwest`-backed implementations speaking the cloud store's JSON
//! dialect: records live under `{database_url}/parts/{id}.json`, image
//! blobs under the bucket's `o` endpoint with percent-encoded object keys.
//! Rules are fully open, so no credentials are attached.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::traits::{CollectionEvent, ImageStore, PartRepository};
use crate::config::RemoteConfig;
use crate::domain::{DomainError, DomainResult, Part};

/// REST client for the parts collection
pub struct RestPartRepository {
    client: reqwest::Client,
    database_url: String,
    poll_interval: Duration,
}

/// Response to a key-allocating POST
#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

impl RestPartRepository {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            database_url: config.database_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/parts.json", self.database_url)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/parts/{}.json", self.database_url, id)
    }

    async fn fetch_collection(
        client: &reqwest::Client,
        url: &str,
    ) -> Result<Vec<serde_json::Value>, String> {
        let response = client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;
        // the collection is a key->record map; a null body means empty
        let body: Option<BTreeMap<String, serde_json::Value>> =
            response.json().await.map_err(|e| e.to_string())?;
        Ok(body.unwrap_or_default().into_values().collect())
    }
}

#[async_trait]
impl PartRepository for RestPartRepository {
    async fn create(&self, part: &Part) -> DomainResult<Part> {
        // the store allocates the key on POST; the record is then written
        // once in full, id included
        let response = self
            .client
            .post(self.collection_url())
            .json(part)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let push: PushResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut stored = part.clone();
        stored.id = push.name;
        self.replace(&stored.id, &stored).await?;
        Ok(stored)
    }

    async fn replace(&self, id: &str, part: &Part) -> DomainResult<()> {
        self.client
            .put(self.record_url(id))
            .json(part)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Part>> {
        let response = self
            .client
            .get(self.record_url(id))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::Database(e.to_string()))?;
        // an absent record comes back as a null body
        response
            .json::<Option<Part>>()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.client
            .delete(self.record_url(id))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }

    async fn subscribe(&self) -> mpsc::UnboundedReceiver<CollectionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.client.clone();
        let url = self.collection_url();
        let interval = self.poll_interval;

        // The store's push channel is not available here, so changes are
        // detected by polling; a snapshot goes out only when the collection
        // actually differs. A transport failure cancels the subscription
        // for good - the consumer decides whether to resubscribe.
        tokio::spawn(async move {
            let mut last: Option<Vec<serde_json::Value>> = None;
            loop {
                if tx.is_closed() {
                    return;
                }
                match RestPartRepository::fetch_collection(&client, &url).await {
                    Ok(snapshot) => {
                        if last.as_ref() != Some(&snapshot) {
                            debug!("collection changed, {} records", snapshot.len());
                            if tx.send(CollectionEvent::Snapshot(snapshot.clone())).is_err() {
                                return;
                            }
                            last = Some(snapshot);
                        }
                    }
                    Err(message) => {
                        warn!("collection poll failed: {}", message);
                        let _ = tx.send(CollectionEvent::Cancelled(message));
                        return;
                    }
                }
                tokio::time::sleep(interval).await;
            }
        });
        rx
    }
}

/// REST client for the image bucket
pub struct RestImageStore {
    client: reqwest::Client,
    storage_url: String,
}

/// Metadata returned by a blob upload
#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "downloadTokens", default)]
    download_tokens: String,
}

impl RestImageStore {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            storage_url: config.storage_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_url(&self, object_key: &str) -> String {
        let encoded = utf8_percent_encode(object_key, NON_ALPHANUMERIC);
        format!("{}/o/{}", self.storage_url, encoded)
    }
}

#[async_trait]
impl ImageStore for RestImageStore {
    async fn upload(&self, bytes: Vec<u8>, object_key: &str) -> DomainResult<String> {
        let mime = mime_guess::from_path(object_key).first_or_octet_stream();
        let upload_url = format!(
            "{}/o?name={}",
            self.storage_url,
            utf8_percent_encode(object_key, NON_ALPHANUMERIC)
        );
        let response = self
            .client
            .post(&upload_url)
            .header("Content-Type", mime.to_string())
            .body(bytes)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let meta: UploadResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        Ok(format!(
            "{}?alt=media&token={}",
            self.object_url(object_key),
            meta.download_tokens
        ))
    }

    async fn delete(&self, url: &str) -> DomainResult<()> {
        // the stored URL addresses the object directly; drop the download
        // query before issuing the DELETE
        let object_url = url.split('?').next().unwrap_or(url);
        self.client
            .delete(object_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Ok(())
    }
}
