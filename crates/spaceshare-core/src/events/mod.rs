//! Domain events emitted by SpaceShare operations.
//!
//! Events are handed to the configured [`AuditSink`](crate::traits::AuditSink)
//! and recorded in the audit trail.

pub mod asset;
pub mod share;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use asset::AssetEvent;
pub use share::ShareEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Who caused the event: an owner ID or a visitor identity.
    pub actor: Option<String>,
    /// Client IP address, when the event came from an HTTP request.
    pub ip_address: Option<String>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A share-link event.
    Share(ShareEvent),
    /// An asset event.
    Asset(AssetEvent),
}

impl EventPayload {
    /// Dotted action name stored in the audit log (e.g. `share.viewed`).
    pub fn action(&self) -> &'static str {
        match self {
            Self::Share(event) => event.action(),
            Self::Asset(event) => event.action(),
        }
    }
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor: Option<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor,
            ip_address: None,
            payload,
        }
    }

    /// Attach the originating IP address.
    pub fn with_ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }

    /// Shorthand for a share event.
    pub fn share(actor: Option<String>, event: ShareEvent) -> Self {
        Self::new(actor, EventPayload::Share(event))
    }

    /// Shorthand for an asset event.
    pub fn asset(actor: Option<String>, event: AssetEvent) -> Self {
        Self::new(actor, EventPayload::Asset(event))
    }
}
