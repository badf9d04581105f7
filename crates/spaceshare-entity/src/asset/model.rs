//! Asset entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use spaceshare_core::types::id::{AssetId, OwnerId};

/// What an asset is used for on a share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "asset_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// A PDF non-disclosure agreement visitors must accept.
    Nda,
    /// A branding logo image.
    Logo,
}

impl AssetKind {
    /// Lowercase name used in paths, routes and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nda => "nda",
            Self::Logo => "logo",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nda" => Ok(Self::Nda),
            "logo" => Ok(Self::Logo),
            other => Err(format!("Invalid asset kind: {other}")),
        }
    }
}

/// Lifecycle of an uploaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "asset_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    /// Bytes are stored and the asset may be referenced by a link.
    Confirmed,
    /// The asset was orphaned and released; it never resolves again.
    Released,
}

/// A stored upload.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    /// Asset identifier.
    pub id: AssetId,
    /// Asset kind.
    pub kind: AssetKind,
    /// Owner who uploaded it.
    pub owner_id: OwnerId,
    /// Detected content type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Path within the storage provider.
    #[serde(skip_serializing)]
    pub storage_path: String,
    /// Lifecycle state.
    pub state: AssetState,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Release time, once released.
    pub released_at: Option<DateTime<Utc>>,
}

impl Asset {
    /// Whether the asset can still be referenced.
    pub fn is_confirmed(&self) -> bool {
        self.state == AssetState::Confirmed
    }

    /// The stable reference handed back to uploaders.
    pub fn reference(&self) -> AssetRef {
        AssetRef {
            id: self.id,
            kind: self.kind,
        }
    }
}

/// Stable opaque reference returned by a confirmed upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    /// Asset identifier.
    pub id: AssetId,
    /// Asset kind.
    pub kind: AssetKind,
}

/// Data required to record a confirmed upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAsset {
    /// Pre-allocated identifier (also used in the storage path).
    pub id: AssetId,
    /// Asset kind.
    pub kind: AssetKind,
    /// Uploading owner.
    pub owner_id: OwnerId,
    /// Detected content type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Storage path.
    pub storage_path: String,
}
