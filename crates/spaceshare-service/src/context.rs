//! Context carrying the authenticated space owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spaceshare_core::types::id::OwnerId;

/// Context for an owner-initiated request.
///
/// Owners are authenticated upstream; this records who is acting and from
/// where so that every operation can scope data and emit attributed events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerContext {
    /// The authenticated owner's ID.
    pub owner_id: OwnerId,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl OwnerContext {
    /// Creates a new owner context.
    pub fn new(owner_id: OwnerId, ip_address: Option<String>) -> Self {
        Self {
            owner_id,
            ip_address,
            request_time: Utc::now(),
        }
    }

    /// The owner ID rendered as an audit actor.
    pub fn actor(&self) -> Option<String> {
        Some(self.owner_id.to_string())
    }
}
