//! Issued share link value object.

use serde::{Deserialize, Serialize};

use super::model::{SecurityLevel, ShareLink};

/// A freshly issued link together with its canonical URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedShareLink {
    /// The persisted policy.
    pub link: ShareLink,
    /// Canonical visitor URL.
    pub url: String,
    /// The visitor token embedded in `url`.
    pub token: String,
}

/// Compact description of the effective policy, for owner-facing output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySummary {
    /// Identity gate.
    pub security_level: SecurityLevel,
    /// Whether a password is required.
    pub password_protected: bool,
    /// Number of allowed emails plus domains.
    pub whitelist_entries: usize,
    /// Expiry, RFC 3339.
    pub expires_at: Option<String>,
    /// View limit.
    pub view_limit: Option<u32>,
    /// Views used so far.
    pub view_count: u32,
    /// Download permission.
    pub allow_downloads: bool,
    /// Q&A permission.
    pub allow_qa: bool,
    /// Watermark flag.
    pub enable_watermark: bool,
    /// NDA requirement.
    pub require_nda: bool,
    /// Whether any branding is set.
    pub branded: bool,
}

impl From<&ShareLink> for PolicySummary {
    fn from(link: &ShareLink) -> Self {
        Self {
            security_level: link.security_level,
            password_protected: link.password_hash.is_some(),
            whitelist_entries: link.allowed_emails.len() + link.allowed_domains.len(),
            expires_at: link.expires_at.map(|t| t.to_rfc3339()),
            view_limit: link.view_limit,
            view_count: link.view_count,
            allow_downloads: link.allow_downloads,
            allow_qa: link.allow_qa,
            enable_watermark: link.enable_watermark,
            require_nda: link.require_nda,
            branded: link.branding.as_ref().is_some_and(|b| !b.is_empty()),
        }
    }
}
