//! Part Entity
//!
//! An inventory part: name, quantity, storage location, remarks, and up to
//! five attached image URLs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Bucket folder every part image lives under
pub const IMAGE_FOLDER: &str = "parts_inventory_01";

/// Maximum number of images a part may carry
pub const MAX_IMAGES: usize = 5;

/// An inventory part
///
/// The wire format is the entity field-for-field as camelCase JSON, no
/// versioning. Every field defaults so records written before a field
/// existed still deserialize (`imageUrls` was added this way, next to the
/// older single `imageUrl`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Part {
    /// Store-assigned key; empty until first save
    pub id: String,
    /// Display name, also the storage-path basename for images
    pub part_name: String,
    pub quantity: i64,
    /// Location fields take numeric-only input but are stored as free text
    pub cabinet_name: String,
    pub shelf_row: String,
    pub shelf_column: String,
    pub remarks: String,
    /// First image URL, kept for records created before multi-image support
    pub image_url: String,
    /// Current representation, at most [`MAX_IMAGES`] entries
    pub image_urls: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Part {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl Part {
    /// URLs to display for this part. The multi-image list wins when it is
    /// non-empty; otherwise the legacy single URL, if any.
    pub fn display_image_urls(&self) -> Vec<String> {
        if !self.image_urls.is_empty() {
            self.image_urls.clone()
        } else if !self.image_url.is_empty() {
            vec![self.image_url.clone()]
        } else {
            Vec::new()
        }
    }

    /// Every URL this part references, legacy field included, deduplicated
    /// by inclusion. This is the enumeration the delete flow walks.
    pub fn all_image_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        if !self.image_url.is_empty() {
            urls.push(self.image_url.clone());
        }
        for url in &self.image_urls {
            if !urls.contains(url) {
                urls.push(url.clone());
            }
        }
        urls
    }
}

/// Object key for the `index`-th image of a part (1-based filename suffix).
/// Spaces in the name become underscores.
pub fn image_object_key(part_name: &str, index: usize) -> String {
    let basename = part_name.trim().replace(' ', "_");
    format!("{}/{}_{}.jpg", IMAGE_FOLDER, basename, index + 1)
}
