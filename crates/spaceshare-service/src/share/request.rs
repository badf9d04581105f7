//! The immutable request handed from the builder to issuance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spaceshare_core::types::id::{AssetId, SpaceId};
use spaceshare_entity::share::SecurityLevel;

/// Branding as entered by the owner, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingRequest {
    /// Uploaded logo.
    pub logo_ref: Option<AssetId>,
    /// Accent colour, `#RGB` or `#RRGGBB`.
    pub accent_color: Option<String>,
    /// Welcome message.
    pub welcome_message: Option<String>,
}

/// A fully assembled link request.
///
/// Produced once by the builder at submission. Issuance re-validates every
/// field; nothing here is trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedShareLinkRequest {
    /// Space being distributed.
    pub space_id: SpaceId,
    /// Optional label.
    pub label: Option<String>,
    /// Identity gate.
    pub security_level: SecurityLevel,
    /// Plaintext password, hashed at issuance.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Raw allowed emails.
    pub allowed_emails: Vec<String>,
    /// Raw allowed domains.
    pub allowed_domains: Vec<String>,
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
    /// Confirmed NDA upload.
    pub nda_document_ref: Option<AssetId>,
    /// Optional branding.
    pub branding: Option<BrandingRequest>,
}
