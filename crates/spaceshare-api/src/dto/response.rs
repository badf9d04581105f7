//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spaceshare_core::types::id::{AssetId, ShareLinkId, SpaceId};
use spaceshare_entity::asset::{AssetKind, AssetRef};
use spaceshare_entity::share::{
    Branding, EffectivePermissions, LinkStatus, NdaAcceptance, PolicySummary, ShareLink,
};
use spaceshare_service::{AccessDecision, DenialReason};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Owner view of a share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResponse {
    /// Link ID.
    pub id: ShareLinkId,
    /// Space distributed.
    pub space_id: SpaceId,
    /// Canonical visitor URL.
    pub url: String,
    /// Label.
    pub label: Option<String>,
    /// Stored status.
    pub status: LinkStatus,
    /// Effective policy.
    pub policy: PolicySummary,
    /// Allowed emails.
    pub allowed_emails: Vec<String>,
    /// Allowed domains.
    pub allowed_domains: Vec<String>,
    /// NDA document.
    pub nda_document_ref: Option<AssetId>,
    /// Branding.
    pub branding: Option<Branding>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Revocation time.
    pub revoked_at: Option<DateTime<Utc>>,
}

impl LinkResponse {
    /// Build from a link and its canonical URL.
    pub fn new(link: &ShareLink, url: String) -> Self {
        Self {
            id: link.id,
            space_id: link.space_id,
            url,
            label: link.label.clone(),
            status: link.status,
            policy: PolicySummary::from(link),
            allowed_emails: link.allowed_emails.iter().cloned().collect(),
            allowed_domains: link.allowed_domains.iter().cloned().collect(),
            nda_document_ref: link.nda_document_ref,
            branding: link.branding.clone(),
            created_at: link.created_at,
            revoked_at: link.revoked_at,
        }
    }
}

/// Link detail with NDA acceptance tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDetailResponse {
    /// The link.
    #[serde(flatten)]
    pub link: LinkResponse,
    /// Distinct visitors who accepted the NDA.
    pub nda_acceptances: u64,
}

/// Confirmed upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetResponse {
    /// Asset reference to use in link requests.
    pub id: AssetId,
    /// Asset kind.
    pub kind: AssetKind,
}

impl From<AssetRef> for AssetResponse {
    fn from(asset: AssetRef) -> Self {
        Self {
            id: asset.id,
            kind: asset.kind,
        }
    }
}

/// What the visitor UI should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    /// Show the content.
    Admitted,
    /// Prompt for the password.
    PasswordRequired,
    /// Prompt for an allowed email (and password).
    EmailRequired,
    /// Present the NDA.
    NdaRequired,
    /// Expired or out of views.
    Unavailable,
    /// Unknown or revoked link.
    NotFound,
}

impl From<DenialReason> for AccessOutcome {
    fn from(reason: DenialReason) -> Self {
        match reason {
            DenialReason::NotFound => Self::NotFound,
            DenialReason::Expired | DenialReason::LimitReached => Self::Unavailable,
            DenialReason::BadCredentials => Self::PasswordRequired,
            DenialReason::Forbidden => Self::EmailRequired,
            DenialReason::NdaPending { .. } => Self::NdaRequired,
        }
    }
}

/// Result of a visitor access request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorAccessResponse {
    /// Next step for the visitor.
    pub outcome: AccessOutcome,
    /// Denial reason, when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// NDA to present when `nda_required`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nda_document: Option<AssetId>,
    /// Granted permissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<EffectivePermissions>,
    /// Branding hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,
    /// Views left, when limited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_views: Option<u32>,
    /// Where the admitted visitor fetches content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
}

impl VisitorAccessResponse {
    /// Render a decision for `token`.
    pub fn from_decision(token: &str, decision: AccessDecision) -> Self {
        match decision {
            AccessDecision::Admitted(grant) => Self {
                outcome: AccessOutcome::Admitted,
                reason: None,
                nda_document: None,
                permissions: Some(grant.permissions),
                branding: grant.branding,
                remaining_views: grant.remaining_views,
                content_url: Some(format!("/api/s/{token}/content")),
            },
            AccessDecision::Denied(reason) => Self {
                outcome: reason.into(),
                reason: Some(reason.as_str().to_string()),
                nda_document: match reason {
                    DenialReason::NdaPending { nda_document } => Some(nda_document),
                    _ => None,
                },
                permissions: None,
                branding: None,
                remaining_views: None,
                content_url: None,
            },
        }
    }
}

/// Recorded NDA acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NdaAcceptResponse {
    /// First acceptance time.
    pub accepted_at: DateTime<Utc>,
    /// Whether an earlier acceptance already existed.
    pub already_accepted: bool,
}

impl NdaAcceptResponse {
    /// Build from the stored record.
    pub fn new(acceptance: &NdaAcceptance, already_accepted: bool) -> Self {
        Self {
            accepted_at: acceptance.accepted_at,
            already_accepted,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Database reachability.
    pub database: String,
    /// Asset storage reachability.
    pub storage: String,
}
