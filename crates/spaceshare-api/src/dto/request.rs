//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use spaceshare_core::types::id::AssetId;
use spaceshare_entity::share::SecurityLevel;
use spaceshare_service::VisitorContext;

/// Body of `POST /api/spaces/{space_id}/links`.
///
/// Assets are referenced by the IDs returned from the asset upload routes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Human label.
    #[validate(length(max = 200, message = "Label is too long"))]
    pub label: Option<String>,
    /// Identity gate.
    #[serde(default = "default_security_level")]
    pub security_level: SecurityLevel,
    /// Link password (Password and Whitelist).
    pub password: Option<String>,
    /// Allowed emails (Whitelist).
    #[serde(default)]
    pub allowed_emails: Vec<String>,
    /// Allowed domains (Whitelist).
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    /// Expiry time.
    pub expires_at: Option<DateTime<Utc>>,
    /// Maximum admitted views.
    #[validate(range(min = 1, message = "View limit must be at least 1"))]
    pub view_limit: Option<u32>,
    /// Download permission.
    #[serde(default)]
    pub allow_downloads: bool,
    /// Q&A permission.
    #[serde(default)]
    pub allow_qa: bool,
    /// Watermark flag.
    #[serde(default)]
    pub enable_watermark: bool,
    /// NDA requirement.
    #[serde(default)]
    pub require_nda: bool,
    /// Uploaded NDA document.
    pub nda_document_ref: Option<AssetId>,
    /// Uploaded logo.
    pub logo_ref: Option<AssetId>,
    /// Accent colour, `#RGB` or `#RRGGBB`.
    pub accent_color: Option<String>,
    /// Welcome message.
    #[validate(length(max = 2000, message = "Welcome message is too long"))]
    pub welcome_message: Option<String>,
}

fn default_security_level() -> SecurityLevel {
    SecurityLevel::Open
}

/// Body of `POST /api/s/{token}/access`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisitorAccessRequest {
    /// Link password.
    pub password: Option<String>,
    /// Visitor email.
    pub email: Option<String>,
    /// Opaque session ID.
    pub session_id: Option<String>,
}

impl VisitorAccessRequest {
    /// Visitor context for the access evaluator.
    pub fn into_visitor(self, ip_address: Option<String>) -> VisitorContext {
        VisitorContext {
            password: self.password,
            email: self.email,
            session_id: self.session_id,
            ip_address,
        }
    }
}

/// Body of `POST /api/s/{token}/nda`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NdaAcceptRequest {
    /// Link password, required on protected links.
    pub password: Option<String>,
    /// Visitor email.
    pub email: Option<String>,
    /// Opaque session ID.
    pub session_id: Option<String>,
}

impl NdaAcceptRequest {
    /// Visitor context keyed by email or session.
    pub fn into_visitor(self, ip_address: Option<String>) -> VisitorContext {
        VisitorContext {
            password: self.password,
            email: self.email,
            session_id: self.session_id,
            ip_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_body_defaults_to_open() {
        let req: CreateLinkRequest = serde_json::from_str("{}").expect("parse");
        assert_eq!(req.security_level, SecurityLevel::Open);
        assert!(req.allowed_emails.is_empty());
        assert!(!req.require_nda);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_zero_view_limit_fails_validation() {
        let req: CreateLinkRequest =
            serde_json::from_str(r#"{"view_limit": 0}"#).expect("parse");
        assert!(req.validate().is_err());
    }
}
