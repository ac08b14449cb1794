//! Multi-Image Capture Coordinator
//!
//! The pending images of one open form dialog. At most [`MAX_IMAGES`]
//! references accumulate; the session resets when the form closes, whether
//! cancelled or submitted.

use tracing::debug;

use crate::domain::{DomainError, DomainResult, MAX_IMAGES};
use crate::repository::{CaptureDevice, CapturedImage};

/// Ordered collection of images captured for an in-progress form
#[derive(Default)]
pub struct CaptureSession {
    images: Vec<CapturedImage>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one capture and append the result. A full session rejects the
    /// attempt without invoking the camera; a camera error leaves the
    /// session unchanged.
    pub async fn capture(&mut self, device: &dyn CaptureDevice) -> DomainResult<()> {
        if self.is_full() {
            return Err(DomainError::Capacity(format!(
                "at most {} images per part",
                MAX_IMAGES
            )));
        }
        let image = device.capture().await?;
        debug!(
            "captured {} ({} of {} pending)",
            image.path.display(),
            self.images.len() + 1,
            MAX_IMAGES
        );
        self.images.push(image);
        Ok(())
    }

    /// Remove a specific pending image by value.
    pub fn remove(&mut self, image: &CapturedImage) {
        self.images.retain(|pending| pending != image);
    }

    /// Drop every pending image (form cancelled or submitted).
    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// Pending images in capture order.
    pub fn images(&self) -> &[CapturedImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.images.len() >= MAX_IMAGES
    }
}
