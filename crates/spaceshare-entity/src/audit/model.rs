//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use spaceshare_core::events::{DomainEvent, EventPayload};
use spaceshare_core::types::id::ShareLinkId;

/// An immutable audit log entry recording a share or asset event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier (the originating event ID).
    pub id: Uuid,
    /// The link concerned, if any.
    pub link_id: Option<ShareLinkId>,
    /// Dotted action name (e.g. `"share.viewed"`, `"asset.released"`).
    pub action: String,
    /// Owner ID or visitor identity that caused the event.
    pub actor: Option<String>,
    /// Full event payload (JSON).
    pub details: Option<serde_json::Value>,
    /// IP address of the actor.
    pub ip_address: Option<String>,
    /// When the event occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// Event ID.
    pub id: Uuid,
    /// The link concerned.
    pub link_id: Option<ShareLinkId>,
    /// The action performed.
    pub action: String,
    /// Actor.
    pub actor: Option<String>,
    /// Additional details.
    pub details: Option<serde_json::Value>,
    /// Actor's IP address.
    pub ip_address: Option<String>,
    /// Event time.
    pub created_at: DateTime<Utc>,
}

impl CreateAuditLogEntry {
    /// Flatten a domain event into an audit row.
    pub fn from_event(event: &DomainEvent) -> Self {
        let link_id = match &event.payload {
            EventPayload::Share(share) => share.share_id(),
            EventPayload::Asset(_) => None,
        };

        Self {
            id: event.id,
            link_id,
            action: event.payload.action().to_string(),
            actor: event.actor.clone(),
            details: serde_json::to_value(&event.payload).ok(),
            ip_address: event.ip_address.clone(),
            created_at: event.timestamp,
        }
    }
}
