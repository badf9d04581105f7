//! Asset domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::AssetId;

/// Events related to NDA and logo uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AssetEvent {
    /// An upload was confirmed.
    Uploaded {
        /// The asset ID.
        asset_id: AssetId,
        /// Asset kind (`nda` or `logo`).
        kind: String,
        /// Size in bytes.
        size_bytes: u64,
    },
    /// An orphaned upload was released.
    Released {
        /// The asset ID.
        asset_id: AssetId,
    },
}

impl AssetEvent {
    /// Dotted action name for the audit log.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Uploaded { .. } => "asset.uploaded",
            Self::Released { .. } => "asset.released",
        }
    }
}
