//! Part Service
//!
//! The add/update/delete pipelines against the remote collaborators. Each
//! user action runs as one independently timed-out unit of work; the add
//! and update pipelines share an atomic in-flight token so a double tap
//! cannot write twice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{info, warn};

use super::capture::CaptureSession;
use crate::config::RemoteConfig;
use crate::domain::{image_object_key, DomainError, DomainResult, Part, PartDraft};
use crate::repository::{ImageStore, PartRepository};

/// Progress of the current submission, for the form's status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpStatus {
    Idle,
    /// Uploading image `index + 1` of `total`
    UploadingImage { index: usize, total: usize },
    SavingRecord,
    Saved { image_count: usize },
    Failed(String),
}

/// Orchestrates part persistence against the database and image store
pub struct PartService {
    repo: Arc<dyn PartRepository>,
    images: Arc<dyn ImageStore>,
    status: watch::Sender<OpStatus>,
    submitting: AtomicBool,
    add_deadline: Duration,
    update_deadline: Duration,
}

impl PartService {
    pub fn new(repo: Arc<dyn PartRepository>, images: Arc<dyn ImageStore>) -> Self {
        Self::with_deadlines(
            repo,
            images,
            Duration::from_secs(60),
            Duration::from_secs(15),
        )
    }

    pub fn from_config(
        repo: Arc<dyn PartRepository>,
        images: Arc<dyn ImageStore>,
        config: &RemoteConfig,
    ) -> Self {
        Self::with_deadlines(
            repo,
            images,
            Duration::from_secs(config.add_timeout_secs),
            Duration::from_secs(config.update_timeout_secs),
        )
    }

    /// Deadlines are per unit of work: the add deadline spans every upload
    /// plus the record write, the update deadline one replace call.
    pub fn with_deadlines(
        repo: Arc<dyn PartRepository>,
        images: Arc<dyn ImageStore>,
        add_deadline: Duration,
        update_deadline: Duration,
    ) -> Self {
        let (status, _) = watch::channel(OpStatus::Idle);
        Self {
            repo,
            images,
            status,
            submitting: AtomicBool::new(false),
            add_deadline,
            update_deadline,
        }
    }

    /// Watch the submission progress.
    pub fn status(&self) -> watch::Receiver<OpStatus> {
        self.status.subscribe()
    }

    /// True while a submission or update holds the token.
    pub fn is_loading(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Seed an edit draft from an existing record. Image fields never enter
    /// the draft; `update_existing` carries them over from the original.
    pub fn begin_edit(part: &Part) -> PartDraft {
        PartDraft::from_part(part)
    }

    /// Persist a new part: validate, upload pending images in capture
    /// order, then write the record once, all inside the add deadline.
    ///
    /// The capture session is left untouched on failure so the user can
    /// retry without recapturing; images uploaded before a failure stay
    /// orphaned in storage.
    pub async fn submit_new(
        &self,
        draft: &PartDraft,
        session: &CaptureSession,
    ) -> DomainResult<Part> {
        draft.validate_new()?;
        let _token = self.acquire_token()?;

        match timeout(self.add_deadline, self.run_submit(draft, session)).await {
            Ok(Ok(part)) => {
                self.set_status(OpStatus::Saved {
                    image_count: part.image_urls.len(),
                });
                info!("part {} saved with {} images", part.id, part.image_urls.len());
                Ok(part)
            }
            Ok(Err(e)) => {
                self.set_status(OpStatus::Failed(e.to_string()));
                Err(e)
            }
            Err(_) => {
                let e = DomainError::Timeout("saving part".to_string());
                self.set_status(OpStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Replace an existing record with the draft's scalar edits, inside the
    /// update deadline. Image fields and creation time carry through from
    /// `original` verbatim; any failure leaves the form state for retry.
    pub async fn update_existing(
        &self,
        original: &Part,
        draft: &PartDraft,
    ) -> DomainResult<Part> {
        draft.validate_update()?;
        if original.id.is_empty() {
            return Err(DomainError::InvalidInput("part has never been saved".to_string()));
        }
        let _token = self.acquire_token()?;

        let replacement = draft.apply_to(original);
        self.set_status(OpStatus::SavingRecord);
        match timeout(
            self.update_deadline,
            self.repo.replace(&original.id, &replacement),
        )
        .await
        {
            Ok(Ok(())) => {
                self.set_status(OpStatus::Saved {
                    image_count: replacement.image_urls.len(),
                });
                info!("part {} updated", original.id);
                Ok(replacement)
            }
            Ok(Err(e)) => {
                self.set_status(OpStatus::Failed(e.to_string()));
                Err(e)
            }
            Err(_) => {
                let e = DomainError::Timeout("updating part".to_string());
                self.set_status(OpStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Delete a part and best-effort its images: the record is read once
    /// to enumerate URLs, each image delete may fail without aborting, and
    /// the record delete always runs last.
    ///
    /// Images added by a concurrent writer between the read and the
    /// deletes are missed; that enumeration staleness is accepted.
    pub async fn delete_part(&self, id: &str) -> DomainResult<()> {
        let part = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("part {}", id)))?;

        for url in part.all_image_urls() {
            if let Err(e) = self.images.delete(&url).await {
                warn!("leaving orphaned image {}: {}", url, e.message());
            }
        }
        self.repo.delete(id).await?;
        info!("part {} deleted", id);
        Ok(())
    }

    async fn run_submit(
        &self,
        draft: &PartDraft,
        session: &CaptureSession,
    ) -> DomainResult<Part> {
        let total = session.len();
        let mut urls = Vec::with_capacity(total);
        // strictly sequential so index-based names and progress stay correct
        for (index, image) in session.images().iter().enumerate() {
            self.set_status(OpStatus::UploadingImage { index, total });
            let bytes = tokio::fs::read(&image.path).await.map_err(|e| {
                DomainError::Capture(format!("image {} unreadable: {}", index + 1, e))
            })?;
            let key = image_object_key(&draft.part_name, index);
            let url = match self.images.upload(bytes, &key).await {
                Ok(url) => url,
                Err(e) => {
                    return Err(DomainError::Storage(format!(
                        "image {} of {}: {}",
                        index + 1,
                        total,
                        e.message()
                    )))
                }
            };
            urls.push(url);
        }

        self.set_status(OpStatus::SavingRecord);
        let part = Part {
            id: String::new(),
            part_name: draft.part_name.trim().to_string(),
            quantity: draft.parsed_quantity(),
            cabinet_name: draft.cabinet_name.trim().to_string(),
            shelf_row: draft.shelf_row.trim().to_string(),
            shelf_column: draft.shelf_column.trim().to_string(),
            remarks: draft.remarks.trim().to_string(),
            image_url: urls.first().cloned().unwrap_or_default(),
            image_urls: urls,
            created_at: Some(Utc::now()),
        };
        self.repo.create(&part).await
    }

    fn set_status(&self, status: OpStatus) {
        self.status.send_replace(status);
    }

    fn acquire_token(&self) -> DomainResult<SubmitToken<'_>> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DomainError::Conflict(
                "another save is already in progress".to_string(),
            ));
        }
        Ok(SubmitToken {
            flag: &self.submitting,
        })
    }
}

/// RAII release for the in-flight submission flag
struct SubmitToken<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SubmitToken<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
