//! Policy validation shared by the builder and issuance.

use std::collections::BTreeSet;

use thiserror::Error;

use spaceshare_core::error::AppError;
use spaceshare_entity::share::{Branding, SecurityLevel, whitelist};

use super::request::CompletedShareLinkRequest;

/// Reasons a link configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Password or Whitelist level without a password.
    #[error("A password is required for this security level")]
    MissingPassword,
    /// Whitelist level with no emails and no domains.
    #[error("A whitelist needs at least one email or domain")]
    EmptyWhitelist,
    /// NDA required but no confirmed NDA document.
    #[error("An NDA document is required")]
    MissingNda,
    /// A referenced asset has the wrong kind.
    #[error("Asset {0} has the wrong type for this field")]
    WrongAssetType(String),
    /// View limit of zero.
    #[error("View limit must be at least 1")]
    InvalidViewLimit,
    /// Malformed allow-list email.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    /// Malformed allow-list domain.
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
    /// Accent colour not in `#RGB`/`#RRGGBB` form.
    #[error("Invalid accent colour: {0}")]
    InvalidAccentColor(String),
    /// Logo reference that does not resolve to a confirmed logo.
    #[error("The logo upload could not be found")]
    UnresolvedLogo,
    /// NDA document supplied while the NDA gate is off.
    #[error("An NDA document was supplied but the NDA is not required")]
    UnexpectedNdaDocument,
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingPassword => "MISSING_PASSWORD",
            Self::EmptyWhitelist => "EMPTY_WHITELIST",
            Self::MissingNda => "MISSING_NDA",
            Self::WrongAssetType(_) => "WRONG_ASSET_TYPE",
            Self::InvalidViewLimit => "INVALID_VIEW_LIMIT",
            Self::InvalidEmail(_) => "INVALID_EMAIL",
            Self::InvalidDomain(_) => "INVALID_DOMAIN",
            Self::InvalidAccentColor(_) => "INVALID_ACCENT_COLOR",
            Self::UnresolvedLogo => "UNRESOLVED_LOGO",
            Self::UnexpectedNdaDocument => "UNEXPECTED_NDA_DOCUMENT",
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let code = err.code();
        AppError::validation(err.to_string()).with_code(code)
    }
}

/// Field values after validation and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPolicy {
    /// Trimmed label, `None` when blank.
    pub label: Option<String>,
    /// Password to hash, present iff the level requires one.
    pub password: Option<String>,
    /// Normalized emails; empty unless Whitelist.
    pub allowed_emails: BTreeSet<String>,
    /// Normalized domains; empty unless Whitelist.
    pub allowed_domains: BTreeSet<String>,
    /// Branding with blanks removed, `None` when nothing is set.
    pub branding: Option<Branding>,
}

/// Whether a password string counts as supplied.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Normalize raw allow-list entries, failing on the first malformed one.
pub fn normalize_whitelist<'a>(
    emails: impl IntoIterator<Item = &'a String>,
    domains: impl IntoIterator<Item = &'a String>,
) -> Result<(BTreeSet<String>, BTreeSet<String>), ValidationError> {
    let emails = emails
        .into_iter()
        .filter(|e| !e.trim().is_empty())
        .map(|e| whitelist::normalize_email(e).ok_or_else(|| ValidationError::InvalidEmail(e.clone())))
        .collect::<Result<BTreeSet<_>, _>>()?;
    let domains = domains
        .into_iter()
        .filter(|d| !d.trim().is_empty())
        .map(|d| {
            whitelist::normalize_domain(d).ok_or_else(|| ValidationError::InvalidDomain(d.clone()))
        })
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok((emails, domains))
}

/// Accept `#RGB` or `#RRGGBB`, returned lower-cased.
pub fn normalize_accent_color(raw: &str) -> Result<String, ValidationError> {
    let color = raw.trim();
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(color.to_ascii_lowercase())
    } else {
        Err(ValidationError::InvalidAccentColor(raw.to_string()))
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Check every policy invariant that does not need the asset store.
///
/// Asset references are only checked for presence here; resolution happens
/// in issuance.
pub fn validate_request(
    request: &CompletedShareLinkRequest,
) -> Result<ValidatedPolicy, ValidationError> {
    let password = match request.security_level {
        SecurityLevel::Open => None,
        SecurityLevel::Password | SecurityLevel::Whitelist => {
            if is_blank(request.password.as_deref()) {
                return Err(ValidationError::MissingPassword);
            }
            request.password.clone()
        }
    };

    let (allowed_emails, allowed_domains) = match request.security_level {
        SecurityLevel::Whitelist => {
            let (emails, domains) =
                normalize_whitelist(&request.allowed_emails, &request.allowed_domains)?;
            if emails.is_empty() && domains.is_empty() {
                return Err(ValidationError::EmptyWhitelist);
            }
            (emails, domains)
        }
        SecurityLevel::Open | SecurityLevel::Password => (BTreeSet::new(), BTreeSet::new()),
    };

    if request.view_limit == Some(0) {
        return Err(ValidationError::InvalidViewLimit);
    }

    match (request.require_nda, request.nda_document_ref) {
        (true, None) => return Err(ValidationError::MissingNda),
        (false, Some(_)) => return Err(ValidationError::UnexpectedNdaDocument),
        _ => {}
    }

    let branding = match &request.branding {
        Some(b) => {
            let accent_color = b
                .accent_color
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .map(normalize_accent_color)
                .transpose()?;
            let branding = Branding {
                logo_ref: b.logo_ref,
                accent_color,
                welcome_message: non_blank(b.welcome_message.as_ref()),
            };
            (!branding.is_empty()).then_some(branding)
        }
        None => None,
    };

    Ok(ValidatedPolicy {
        label: non_blank(request.label.as_ref()),
        password,
        allowed_emails,
        allowed_domains,
        branding,
    })
}

#[cfg(test)]
mod tests {
    use spaceshare_core::error::ErrorKind;
    use spaceshare_core::types::id::{AssetId, SpaceId};

    use super::super::request::BrandingRequest;
    use super::*;

    fn request(level: SecurityLevel) -> CompletedShareLinkRequest {
        CompletedShareLinkRequest {
            space_id: SpaceId::new(),
            label: Some("  Q3 board pack ".into()),
            security_level: level,
            password: None,
            allowed_emails: Vec::new(),
            allowed_domains: Vec::new(),
            expires_at: None,
            view_limit: None,
            allow_downloads: false,
            allow_qa: false,
            enable_watermark: false,
            require_nda: false,
            nda_document_ref: None,
            branding: None,
        }
    }

    #[test]
    fn test_password_levels_require_password() {
        let mut req = request(SecurityLevel::Password);
        assert_eq!(validate_request(&req), Err(ValidationError::MissingPassword));
        req.password = Some("   ".into());
        assert_eq!(validate_request(&req), Err(ValidationError::MissingPassword));
        req.password = Some("hunter2".into());
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_open_level_drops_password_and_whitelist() {
        let mut req = request(SecurityLevel::Open);
        req.password = Some("ignored".into());
        req.allowed_emails = vec!["alice@acme.com".into()];
        let policy = validate_request(&req).unwrap();
        assert_eq!(policy.password, None);
        assert!(policy.allowed_emails.is_empty());
        assert_eq!(policy.label.as_deref(), Some("Q3 board pack"));
    }

    #[test]
    fn test_whitelist_normalizes_and_rejects_empty() {
        let mut req = request(SecurityLevel::Whitelist);
        req.password = Some("pw".into());
        req.allowed_emails = vec!["  ".into()];
        assert_eq!(validate_request(&req), Err(ValidationError::EmptyWhitelist));

        req.allowed_emails = vec![" Carol@Partner.IO ".into()];
        req.allowed_domains = vec!["@ACME.com".into()];
        let policy = validate_request(&req).unwrap();
        assert!(policy.allowed_emails.contains("carol@partner.io"));
        assert!(policy.allowed_domains.contains("acme.com"));

        req.allowed_domains = vec!["not a domain".into()];
        assert_eq!(
            validate_request(&req),
            Err(ValidationError::InvalidDomain("not a domain".into()))
        );
    }

    #[test]
    fn test_nda_reference_matches_flag() {
        let mut req = request(SecurityLevel::Open);
        req.require_nda = true;
        assert_eq!(validate_request(&req), Err(ValidationError::MissingNda));
        req.nda_document_ref = Some(AssetId::new());
        assert!(validate_request(&req).is_ok());
        req.require_nda = false;
        assert_eq!(
            validate_request(&req),
            Err(ValidationError::UnexpectedNdaDocument)
        );
    }

    #[test]
    fn test_view_limit_and_branding() {
        let mut req = request(SecurityLevel::Open);
        req.view_limit = Some(0);
        assert_eq!(validate_request(&req), Err(ValidationError::InvalidViewLimit));
        req.view_limit = Some(1);

        req.branding = Some(BrandingRequest {
            logo_ref: None,
            accent_color: Some("#FF8800".into()),
            welcome_message: Some("  ".into()),
        });
        let policy = validate_request(&req).unwrap();
        let branding = policy.branding.unwrap();
        assert_eq!(branding.accent_color.as_deref(), Some("#ff8800"));
        assert_eq!(branding.welcome_message, None);

        req.branding = Some(BrandingRequest::default());
        assert_eq!(validate_request(&req).unwrap().branding, None);

        assert!(normalize_accent_color("#abc").is_ok());
        assert!(normalize_accent_color("orange").is_err());
        assert!(normalize_accent_color("#abcd").is_err());
    }

    #[test]
    fn test_maps_into_app_error_with_code() {
        let err: AppError = ValidationError::EmptyWhitelist.into();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.code, Some("EMPTY_WHITELIST"));
    }
}
