//! Remote Endpoint Configuration
//!
//! Where the record database and image bucket live, plus the per-operation
//! deadlines. Stored as a plain JSON file; every field has a default so a
//! missing or partial file still yields a working configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the record database
    pub database_url: String,
    /// Base URL of the image bucket
    pub storage_url: String,
    /// Collection poll cadence for the REST subscription
    pub poll_interval_ms: u64,
    /// Deadline for a full add submission (uploads plus record write)
    pub add_timeout_secs: u64,
    /// Deadline for a record replace
    pub update_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            database_url: "https://parts-inventory-default.db.example.com".to_string(),
            storage_url: "https://storage.example.com/v0/b/parts-inventory".to_string(),
            poll_interval_ms: 2_000,
            add_timeout_secs: 60,
            update_timeout_secs: 15,
        }
    }
}

impl RemoteConfig {
    /// Load from a JSON file, falling back to defaults when the file does
    /// not exist.
    pub fn load(path: &Path) -> DomainResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Internal(format!("reading {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| DomainError::Internal(format!("parsing {}: {}", path.display(), e)))
    }

    /// Persist to a JSON file.
    pub fn save(&self, path: &Path) -> DomainResult<()> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        std::fs::write(path, raw)
            .map_err(|e| DomainError::Internal(format!("writing {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::RemoteConfig;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = RemoteConfig::load(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, RemoteConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "poll_interval_ms": 500 }"#).expect("write");

        let config = RemoteConfig::load(&path).expect("load");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.add_timeout_secs, 60);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");

        let mut config = RemoteConfig::default();
        config.database_url = "https://other.db.example.com".to_string();
        config.save(&path).expect("save");

        assert_eq!(RemoteConfig::load(&path).expect("load"), config);
    }
}
