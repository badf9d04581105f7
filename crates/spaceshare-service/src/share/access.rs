//! Access evaluation: the ordered gate pipeline every visitor request
//! passes before reaching content.
//!
//! Gates run in a fixed order and stop at the first denial, so a visitor
//! only ever learns about the first restriction they fail:
//!
//! 1. existence and revocation
//! 2. expiry
//! 3. quota pre-check
//! 4. identity gate for the link's security level
//! 5. NDA acceptance
//! 6. admission, which counts the view atomically

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use spaceshare_auth::PasswordHasher;
use spaceshare_core::error::AppError;
use spaceshare_core::events::{DomainEvent, ShareEvent};
use spaceshare_core::result::AppResult;
use spaceshare_core::traits::AuditSink;
use spaceshare_core::types::id::{AssetId, ShareLinkId};
use spaceshare_database::{NdaAcceptanceStore, ShareLinkStore};
use spaceshare_entity::share::{Branding, EffectivePermissions, SecurityLevel, ShareLink, whitelist};

use super::quota::{Admission, ViewLimitCounter};
use crate::audit;

/// What a visitor presents with a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisitorContext {
    /// Link password, if prompted.
    pub password: Option<String>,
    /// Visitor email.
    pub email: Option<String>,
    /// Opaque session ID for visitors without an email.
    pub session_id: Option<String>,
    /// Client IP address.
    pub ip_address: Option<String>,
}

impl VisitorContext {
    /// Normalized email when one was supplied and is well formed.
    pub fn normalized_email(&self) -> Option<String> {
        self.email.as_deref().and_then(whitelist::normalize_email)
    }

    /// The identity NDA acceptances are keyed by: the normalized email,
    /// else the session ID.
    pub fn identity(&self) -> Option<String> {
        self.normalized_email().or_else(|| {
            self.session_id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    }
}

/// Why a visitor was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    /// Unknown or revoked link.
    NotFound,
    /// Past the expiry time.
    Expired,
    /// Every allowed view is used.
    LimitReached,
    /// Wrong or missing password.
    BadCredentials,
    /// Not on the allow-list, or wrong password on a whitelisted link.
    Forbidden,
    /// The NDA must be accepted first.
    NdaPending {
        /// Document to present.
        nda_document: AssetId,
    },
}

impl DenialReason {
    /// Snake-case name recorded in audit events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Expired => "expired",
            Self::LimitReached => "limit_reached",
            Self::BadCredentials => "bad_credentials",
            Self::Forbidden => "forbidden",
            Self::NdaPending { .. } => "nda_pending",
        }
    }

    /// Whether supplying something (password, email, acceptance) can turn
    /// this into an admission.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::BadCredentials | Self::Forbidden | Self::NdaPending { .. }
        )
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DenialReason> for AppError {
    fn from(reason: DenialReason) -> Self {
        match reason {
            DenialReason::NotFound => {
                AppError::not_found("Share link not found").with_code("LINK_NOT_FOUND")
            }
            DenialReason::Expired | DenialReason::LimitReached => {
                AppError::gone(format!("Share link is no longer available ({reason})"))
                    .with_code("LINK_UNAVAILABLE")
            }
            DenialReason::BadCredentials => {
                AppError::authentication("A valid password is required")
                    .with_code("PASSWORD_REQUIRED")
            }
            DenialReason::Forbidden => {
                AppError::authorization("An allowed email and the password are required")
                    .with_code("EMAIL_REQUIRED")
            }
            DenialReason::NdaPending { .. } => {
                AppError::authorization("The NDA must be accepted first").with_code("NDA_REQUIRED")
            }
        }
    }
}

/// What an admitted visitor may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionGrant {
    /// The admitting link.
    pub link_id: ShareLinkId,
    /// Content permissions.
    pub permissions: EffectivePermissions,
    /// Rendering hints.
    pub branding: Option<Branding>,
    /// View count including this admission.
    pub view_count: u32,
    /// Views left after this one, `None` when unlimited.
    pub remaining_views: Option<u32>,
    /// Identity the view was recorded against.
    pub visitor_identity: Option<String>,
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Content may be served.
    Admitted(AdmissionGrant),
    /// The visitor was turned away.
    Denied(DenialReason),
}

impl AccessDecision {
    /// Whether the visitor was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }

    /// The denial reason, if denied.
    pub fn denial(&self) -> Option<DenialReason> {
        match self {
            Self::Admitted(_) => None,
            Self::Denied(reason) => Some(*reason),
        }
    }
}

/// Runs the gate pipeline for visitor requests.
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    share_links: Arc<dyn ShareLinkStore>,
    nda_acceptances: Arc<dyn NdaAcceptanceStore>,
    counter: ViewLimitCounter,
    hasher: Arc<PasswordHasher>,
    audit: Arc<dyn AuditSink>,
}

impl AccessEvaluator {
    /// Creates a new evaluator.
    pub fn new(
        share_links: Arc<dyn ShareLinkStore>,
        nda_acceptances: Arc<dyn NdaAcceptanceStore>,
        hasher: Arc<PasswordHasher>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            counter: ViewLimitCounter::new(share_links.clone()),
            share_links,
            nda_acceptances,
            hasher,
            audit,
        }
    }

    /// Evaluate a visitor request against the current time.
    pub async fn evaluate(&self, token: &str, visitor: &VisitorContext) -> AppResult<AccessDecision> {
        self.evaluate_at(token, visitor, Utc::now()).await
    }

    /// Evaluate a visitor request as of `now`.
    pub async fn evaluate_at(
        &self,
        token: &str,
        visitor: &VisitorContext,
        now: DateTime<Utc>,
    ) -> AppResult<AccessDecision> {
        let link = self.share_links.find_by_token(token).await?;
        let (link_id, decision) = match link {
            Some(link) => (Some(link.id), self.run_gates(&link, visitor, now).await?),
            None => (None, AccessDecision::Denied(DenialReason::NotFound)),
        };

        let actor = visitor.identity();
        let event = match &decision {
            AccessDecision::Admitted(grant) => {
                info!(
                    share_id = %grant.link_id,
                    view_count = grant.view_count,
                    "Visitor admitted"
                );
                ShareEvent::Viewed {
                    share_id: grant.link_id,
                    view_count: grant.view_count,
                }
            }
            AccessDecision::Denied(reason) => {
                info!(share_id = ?link_id, reason = %reason, "Visitor denied");
                ShareEvent::Denied {
                    share_id: link_id,
                    reason: reason.as_str().to_string(),
                }
            }
        };
        audit::record(
            self.audit.as_ref(),
            DomainEvent::share(actor, event).with_ip(visitor.ip_address.clone()),
        )
        .await;

        Ok(decision)
    }

    /// Check a link without admitting anyone.
    ///
    /// Runs the existence, revocation, and expiry gates, plus the identity
    /// gate when `visitor` is given. Counts no view, skips the quota and NDA
    /// gates, and records nothing. Used to serve material a visitor needs
    /// before admission.
    pub async fn check(
        &self,
        token: &str,
        visitor: Option<&VisitorContext>,
    ) -> AppResult<Result<ShareLink, DenialReason>> {
        self.check_at(token, visitor, Utc::now()).await
    }

    /// [`Self::check`] as of `now`.
    pub async fn check_at(
        &self,
        token: &str,
        visitor: Option<&VisitorContext>,
        now: DateTime<Utc>,
    ) -> AppResult<Result<ShareLink, DenialReason>> {
        let Some(link) = self.share_links.find_by_token(token).await? else {
            return Ok(Err(DenialReason::NotFound));
        };
        if let Some(reason) = availability(&link, now) {
            return Ok(Err(reason));
        }
        if let Some(visitor) = visitor {
            if let Some(reason) = self.identity_gate(&link, visitor)? {
                debug!(share_id = %link.id, reason = %reason, "Link check denied");
                return Ok(Err(reason));
            }
        }
        Ok(Ok(link))
    }

    async fn run_gates(
        &self,
        link: &ShareLink,
        visitor: &VisitorContext,
        now: DateTime<Utc>,
    ) -> AppResult<AccessDecision> {
        if let Some(reason) = availability(link, now) {
            return Ok(AccessDecision::Denied(reason));
        }
        if link.is_limit_reached() {
            return Ok(AccessDecision::Denied(DenialReason::LimitReached));
        }
        if let Some(reason) = self.identity_gate(link, visitor)? {
            return Ok(AccessDecision::Denied(reason));
        }

        let identity = visitor.identity();
        if let Some(reason) = self.nda_gate(link, identity.as_deref()).await? {
            return Ok(AccessDecision::Denied(reason));
        }

        let view_count = match self.counter.try_admit(link.id).await? {
            Admission::Counted { view_count } => view_count,
            Admission::Exhausted => return Ok(AccessDecision::Denied(DenialReason::LimitReached)),
            Admission::Unavailable => return Ok(AccessDecision::Denied(DenialReason::NotFound)),
        };

        Ok(AccessDecision::Admitted(AdmissionGrant {
            link_id: link.id,
            permissions: link.permissions(),
            branding: link.branding.clone(),
            view_count,
            remaining_views: link.view_limit.map(|l| l.saturating_sub(view_count)),
            visitor_identity: identity,
        }))
    }

    fn identity_gate(
        &self,
        link: &ShareLink,
        visitor: &VisitorContext,
    ) -> AppResult<Option<DenialReason>> {
        match link.security_level {
            SecurityLevel::Open => Ok(None),
            SecurityLevel::Password => Ok((!self.password_matches(link, visitor)?)
                .then_some(DenialReason::BadCredentials)),
            SecurityLevel::Whitelist => {
                let listed = visitor
                    .email
                    .as_deref()
                    .is_some_and(|email| link.whitelist_allows(email));
                // Always verify; timing must not reveal allow-list membership.
                let password_ok = self.password_matches(link, visitor)?;
                Ok((!(listed && password_ok)).then_some(DenialReason::Forbidden))
            }
        }
    }

    fn password_matches(&self, link: &ShareLink, visitor: &VisitorContext) -> AppResult<bool> {
        let Some(hash) = link.password_hash.as_deref() else {
            return Err(AppError::internal(format!(
                "Share link {} has no password hash",
                link.id
            )));
        };
        match visitor.password.as_deref() {
            Some(password) if !password.is_empty() => self.hasher.verify_password(password, hash),
            _ => Ok(false),
        }
    }

    async fn nda_gate(
        &self,
        link: &ShareLink,
        identity: Option<&str>,
    ) -> AppResult<Option<DenialReason>> {
        if !link.require_nda {
            return Ok(None);
        }
        let Some(nda_document) = link.nda_document_ref else {
            return Err(AppError::internal(format!(
                "Share link {} requires an NDA but has no document",
                link.id
            )));
        };
        let pending = DenialReason::NdaPending { nda_document };

        let Some(identity) = identity else {
            return Ok(Some(pending));
        };
        let accepted = self.nda_acceptances.find(link.id, identity).await?.is_some();
        debug!(share_id = %link.id, accepted, "NDA gate checked");
        Ok((!accepted).then_some(pending))
    }
}

/// Existence and expiry gates.
fn availability(link: &ShareLink, now: DateTime<Utc>) -> Option<DenialReason> {
    if link.is_revoked() {
        Some(DenialReason::NotFound)
    } else if link.is_expired_at(now) {
        Some(DenialReason::Expired)
    } else {
        None
    }
}
