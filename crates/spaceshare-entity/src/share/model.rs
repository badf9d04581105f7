//! Share link entity model.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spaceshare_core::types::id::{AssetId, OwnerId, ShareLinkId, SpaceId};

use super::whitelist;

/// Identity gate applied to visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "security_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Anyone holding the link may view.
    Open,
    /// Visitors must supply the link password.
    Password,
    /// Visitors must be on the email/domain allow-list and supply the password.
    Whitelist,
}

impl SecurityLevel {
    /// Whether links at this level carry a password hash.
    pub fn requires_password(&self) -> bool {
        match self {
            Self::Open => false,
            Self::Password | Self::Whitelist => true,
        }
    }

    /// Lowercase name used in events and DTOs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Password => "password",
            Self::Whitelist => "whitelist",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "password" => Ok(Self::Password),
            "whitelist" => Ok(Self::Whitelist),
            other => Err(format!("Invalid security level: {other}")),
        }
    }
}

/// Stored link status. Expiry and quota exhaustion are derived, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "link_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// The link may admit visitors.
    Active,
    /// The owner revoked the link. Terminal.
    Revoked,
}

/// Optional visitor-facing branding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    /// Confirmed logo asset.
    pub logo_ref: Option<AssetId>,
    /// Accent colour as `#RGB` or `#RRGGBB`.
    pub accent_color: Option<String>,
    /// Message shown before the documents.
    pub welcome_message: Option<String>,
}

impl Branding {
    /// True when no branding field is set.
    pub fn is_empty(&self) -> bool {
        self.logo_ref.is_none() && self.accent_color.is_none() && self.welcome_message.is_none()
    }
}

/// Content permissions granted to an admitted visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePermissions {
    /// Documents may be downloaded.
    pub allow_downloads: bool,
    /// Visitors may ask questions.
    pub allow_qa: bool,
    /// Pages are rendered with a visitor watermark.
    pub enable_watermark: bool,
}

/// The persisted access-control policy for one distribution of a space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    /// Unique link identifier.
    pub id: ShareLinkId,
    /// Space being distributed.
    pub space_id: SpaceId,
    /// Owner who issued the link.
    pub created_by: OwnerId,
    /// Visitor-facing token.
    #[serde(skip_serializing)]
    pub token: String,
    /// Human label, no semantic effect.
    pub label: Option<String>,
    /// Identity gate.
    pub security_level: SecurityLevel,
    /// Argon2id hash; set iff the security level requires a password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Normalized allowed emails (Whitelist only).
    pub allowed_emails: BTreeSet<String>,
    /// Normalized allowed domains (Whitelist only).
    pub allowed_domains: BTreeSet<String>,
    /// Expiry time; `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Maximum admitted views; `None` is unlimited.
    pub view_limit: Option<u32>,
    /// Admitted views so far.
    pub view_count: u32,
    /// Download permission.
    pub allow_downloads: bool,
    /// Q&A permission.
    pub allow_qa: bool,
    /// Watermark flag.
    pub enable_watermark: bool,
    /// Whether visitors must accept an NDA.
    pub require_nda: bool,
    /// NDA document; set iff `require_nda`.
    pub nda_document_ref: Option<AssetId>,
    /// Optional branding.
    pub branding: Option<Branding>,
    /// Stored status.
    pub status: LinkStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Revocation time.
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ShareLink {
    /// Whether the owner revoked this link.
    pub fn is_revoked(&self) -> bool {
        self.status == LinkStatus::Revoked
    }

    /// Whether the link is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }

    /// Whether every allowed view has been used.
    pub fn is_limit_reached(&self) -> bool {
        matches!(self.view_limit, Some(limit) if self.view_count >= limit)
    }

    /// Remaining admissions, `None` when unlimited.
    pub fn remaining_views(&self) -> Option<u32> {
        self.view_limit
            .map(|limit| limit.saturating_sub(self.view_count))
    }

    /// Content permissions granted on admission.
    pub fn permissions(&self) -> EffectivePermissions {
        EffectivePermissions {
            allow_downloads: self.allow_downloads,
            allow_qa: self.allow_qa,
            enable_watermark: self.enable_watermark,
        }
    }

    /// Whether the link points at `asset_id` as its NDA document or logo.
    pub fn references_asset(&self, asset_id: AssetId) -> bool {
        self.nda_document_ref == Some(asset_id)
            || self.branding.as_ref().and_then(|b| b.logo_ref) == Some(asset_id)
    }

    /// Whether `email` passes the allow-list, by exact address or by domain.
    pub fn whitelist_allows(&self, email: &str) -> bool {
        let Some(email) = whitelist::normalize_email(email) else {
            return false;
        };
        if self.allowed_emails.contains(&email) {
            return true;
        }
        whitelist::email_domain(&email)
            .is_some_and(|domain| self.allowed_domains.contains(domain))
    }
}

/// Data required to persist a new link.
///
/// Built by the issuance service after every invariant has been checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareLink {
    /// Space being distributed.
    pub space_id: SpaceId,
    /// Issuing owner.
    pub created_by: OwnerId,
    /// Minted token.
    pub token: String,
    /// Label.
    pub label: Option<String>,
    /// Identity gate.
    pub security_level: SecurityLevel,
    /// Password hash.
    pub password_hash: Option<String>,
    /// Normalized allowed emails.
    pub allowed_emails: BTreeSet<String>,
    /// Normalized allowed domains.
    pub allowed_domains: BTreeSet<String>,
    /// Expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// View limit.
    pub view_limit: Option<u32>,
    /// Download permission.
    pub allow_downloads: bool,
    /// Q&A permission.
    pub allow_qa: bool,
    /// Watermark flag.
    pub enable_watermark: bool,
    /// NDA requirement.
    pub require_nda: bool,
    /// NDA document.
    pub nda_document_ref: Option<AssetId>,
    /// Branding.
    pub branding: Option<Branding>,
}

impl CreateShareLink {
    /// Assets the new link will reference.
    pub fn asset_refs(&self) -> Vec<AssetId> {
        self.nda_document_ref
            .into_iter()
            .chain(self.branding.as_ref().and_then(|b| b.logo_ref))
            .collect()
    }

    /// Materialize the record with a fresh ID and creation time.
    pub fn into_link(self, id: ShareLinkId, created_at: DateTime<Utc>) -> ShareLink {
        ShareLink {
            id,
            space_id: self.space_id,
            created_by: self.created_by,
            token: self.token,
            label: self.label,
            security_level: self.security_level,
            password_hash: self.password_hash,
            allowed_emails: self.allowed_emails,
            allowed_domains: self.allowed_domains,
            expires_at: self.expires_at,
            view_limit: self.view_limit,
            view_count: 0,
            allow_downloads: self.allow_downloads,
            allow_qa: self.allow_qa,
            enable_watermark: self.enable_watermark,
            require_nda: self.require_nda,
            nda_document_ref: self.nda_document_ref,
            branding: self.branding,
            status: LinkStatus::Active,
            created_at,
            revoked_at: None,
        }
    }
}
