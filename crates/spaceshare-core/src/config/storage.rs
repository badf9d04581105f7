//! Asset storage configuration.

use serde::{Deserialize, Serialize};

/// Where and how uploaded NDA documents and logos are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for the local storage provider.
    #[serde(default = "default_root")]
    pub root_path: String,
    /// Largest accepted asset upload, in bytes.
    #[serde(default = "default_max_asset_size")]
    pub max_asset_size_bytes: u64,
    /// Per-upload write timeout in seconds. A timed-out upload is retryable.
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root(),
            max_asset_size_bytes: default_max_asset_size(),
            upload_timeout_seconds: default_upload_timeout(),
        }
    }
}

fn default_root() -> String {
    "./data/assets".to_string()
}

fn default_max_asset_size() -> u64 {
    25 * 1024 * 1024
}

fn default_upload_timeout() -> u64 {
    60
}
