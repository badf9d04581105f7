//! NDA acceptance record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use spaceshare_core::types::id::ShareLinkId;

/// A visitor's acceptance of a link's NDA.
///
/// At most one record exists per `(link_id, visitor_identity)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NdaAcceptance {
    /// The link whose NDA was accepted.
    pub link_id: ShareLinkId,
    /// Normalized email, or an opaque session ID for anonymous visitors.
    pub visitor_identity: String,
    /// First acceptance time.
    pub accepted_at: DateTime<Utc>,
}
