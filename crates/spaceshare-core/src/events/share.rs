//! Share-link domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::{AssetId, ShareLinkId, SpaceId};

/// Events related to share-link issuance and visitor access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShareEvent {
    /// A link was issued.
    Created {
        /// The link ID.
        share_id: ShareLinkId,
        /// The space being distributed.
        space_id: SpaceId,
        /// Security level (`open`, `password`, `whitelist`).
        security_level: String,
        /// Whether visitors must accept an NDA.
        require_nda: bool,
        /// View limit, if any.
        view_limit: Option<u32>,
    },
    /// A visitor was admitted.
    Viewed {
        /// The link ID.
        share_id: ShareLinkId,
        /// View count after this admission.
        view_count: u32,
    },
    /// A visitor was denied.
    Denied {
        /// The link ID; `None` when the token matched nothing.
        share_id: Option<ShareLinkId>,
        /// Internal denial reason.
        reason: String,
    },
    /// A visitor accepted the link's NDA.
    NdaAccepted {
        /// The link ID.
        share_id: ShareLinkId,
        /// The NDA document that was accepted.
        nda_document: AssetId,
    },
    /// The owner revoked a link.
    Revoked {
        /// The link ID.
        share_id: ShareLinkId,
    },
}

impl ShareEvent {
    /// Dotted action name for the audit log.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Created { .. } => "share.created",
            Self::Viewed { .. } => "share.viewed",
            Self::Denied { .. } => "share.denied",
            Self::NdaAccepted { .. } => "share.nda_accepted",
            Self::Revoked { .. } => "share.revoked",
        }
    }

    /// The link this event concerns, if known.
    pub fn share_id(&self) -> Option<ShareLinkId> {
        match self {
            Self::Created { share_id, .. }
            | Self::Viewed { share_id, .. }
            | Self::NdaAccepted { share_id, .. }
            | Self::Revoked { share_id } => Some(*share_id),
            Self::Denied { share_id, .. } => *share_id,
        }
    }
}
