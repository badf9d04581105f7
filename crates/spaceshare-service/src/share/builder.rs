//! Share request builder: a three-step wizard that accumulates a draft
//! policy, gates each transition on validation, and hands an immutable
//! snapshot to issuance.
//!
//! ```text
//! Configuring --advance--> Branding --advance--> Review --submit--> issued
//!      ^                      |   ^                 |
//!      +--------back----------+   +------back-------+
//! ```
//!
//! Uploads attached to the draft are tracked so that anything the final
//! link does not reference is released on submit or cancel.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use spaceshare_core::error::AppError;
use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::{AssetId, OwnerId, ShareLinkId, SpaceId};
use spaceshare_entity::asset::{AssetKind, AssetRef};
use spaceshare_entity::share::{IssuedShareLink, SecurityLevel};

use super::issuance::LinkIssuanceService;
use super::request::{BrandingRequest, CompletedShareLinkRequest};
use super::validation::{ValidationError, is_blank};
use crate::asset::{AssetProvisioner, UploadError};
use crate::context::OwnerContext;

/// Wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Access policy and permissions.
    Configuring,
    /// Optional logo, colour, and welcome message.
    Branding,
    /// Final check before submission.
    Review,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Configuring => "configuring",
            Self::Branding => "branding",
            Self::Review => "review",
        })
    }
}

/// One draft mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareField {
    /// Set or clear the label.
    Label(Option<String>),
    /// Choose the identity gate.
    SecurityLevel(SecurityLevel),
    /// Set the link password.
    Password(String),
    /// Text in the email entry box, not yet committed to the list.
    PendingEmail(String),
    /// Add an allowed email.
    AddEmail(String),
    /// Remove an allowed email.
    RemoveEmail(String),
    /// Add an allowed domain.
    AddDomain(String),
    /// Remove an allowed domain.
    RemoveDomain(String),
    /// Set or clear the expiry.
    ExpiresAt(Option<DateTime<Utc>>),
    /// Set or clear the view limit.
    ViewLimit(Option<u32>),
    /// Download permission.
    AllowDownloads(bool),
    /// Q&A permission.
    AllowQa(bool),
    /// Watermark flag.
    EnableWatermark(bool),
    /// NDA requirement.
    RequireNda(bool),
    /// Set or clear the accent colour.
    AccentColor(Option<String>),
    /// Set or clear the welcome message.
    WelcomeMessage(Option<String>),
}

/// Invalid use of the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// The action is not available at the current step.
    #[error("Cannot {action} from the {step} step")]
    InvalidTransition {
        /// Attempted action.
        action: &'static str,
        /// Current step.
        step: WizardStep,
    },
    /// The request already produced a link.
    #[error("The share request was already submitted")]
    AlreadyCommitted,
    /// The request was cancelled.
    #[error("The share request was cancelled")]
    Cancelled,
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        let code = match err {
            WizardError::InvalidTransition { .. } => "INVALID_TRANSITION",
            WizardError::AlreadyCommitted => "ALREADY_COMMITTED",
            WizardError::Cancelled => "CANCELLED",
        };
        AppError::conflict(err.to_string()).with_code(code)
    }
}

/// Asset bytes held until submission.
#[derive(Debug, Clone)]
pub struct StagedAsset {
    /// Content type declared by the client.
    pub content_type: Option<String>,
    /// Raw bytes.
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
enum AssetSlot {
    #[default]
    Empty,
    Staged(StagedAsset),
    Uploaded(AssetId),
}

impl AssetSlot {
    fn uploaded(&self) -> Option<AssetId> {
        match self {
            Self::Uploaded(id) => Some(*id),
            Self::Empty | Self::Staged(_) => None,
        }
    }

    fn staged(&self) -> Option<StagedAsset> {
        match self {
            Self::Staged(staged) => Some(staged.clone()),
            Self::Empty | Self::Uploaded(_) => None,
        }
    }

    fn is_attached(&self) -> bool {
        !matches!(self, Self::Empty)
    }
}

/// The in-progress policy. Read-only outside the builder.
#[derive(Debug, Clone, Default)]
pub struct ShareDraft {
    /// Label.
    pub label: Option<String>,
    /// Identity gate.
    pub security_level: Option<SecurityLevel>,
    /// Plaintext password.
    pub password: Option<String>,
    /// Uncommitted email entry.
    pub pending_email: Option<String>,
    /// Allowed emails, raw.
    pub allowed_emails: Vec<String>,
    /// Allowed domains, raw.
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
    /// Accent colour.
    pub accent_color: Option<String>,
    /// Welcome message.
    pub welcome_message: Option<String>,
}

impl ShareDraft {
    /// Security level, Open until chosen.
    pub fn level(&self) -> SecurityLevel {
        self.security_level.unwrap_or(SecurityLevel::Open)
    }

    fn apply(&mut self, field: ShareField) {
        match field {
            ShareField::Label(v) => self.label = v,
            ShareField::SecurityLevel(v) => self.security_level = Some(v),
            ShareField::Password(v) => self.password = Some(v),
            ShareField::PendingEmail(v) => self.pending_email = Some(v),
            ShareField::AddEmail(v) => {
                if !self.allowed_emails.contains(&v) {
                    self.allowed_emails.push(v);
                }
            }
            ShareField::RemoveEmail(v) => self.allowed_emails.retain(|e| e != &v),
            ShareField::AddDomain(v) => {
                if !self.allowed_domains.contains(&v) {
                    self.allowed_domains.push(v);
                }
            }
            ShareField::RemoveDomain(v) => self.allowed_domains.retain(|d| d != &v),
            ShareField::ExpiresAt(v) => self.expires_at = v,
            ShareField::ViewLimit(v) => self.view_limit = v,
            ShareField::AllowDownloads(v) => self.allow_downloads = v,
            ShareField::AllowQa(v) => self.allow_qa = v,
            ShareField::EnableWatermark(v) => self.enable_watermark = v,
            ShareField::RequireNda(v) => self.require_nda = v,
            ShareField::AccentColor(v) => self.accent_color = v,
            ShareField::WelcomeMessage(v) => self.welcome_message = v,
        }
    }

    fn fold_pending_email(&mut self) {
        if let Some(pending) = self.pending_email.take() {
            let pending = pending.trim().to_string();
            if !pending.is_empty() {
                self.apply(ShareField::AddEmail(pending));
            }
        }
    }

    fn has_whitelist_entry(&self) -> bool {
        self.allowed_emails
            .iter()
            .chain(&self.allowed_domains)
            .any(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Open,
    Committed(ShareLinkId),
    Cancelled,
}

/// Drives one owner through configuring and submitting a share link.
#[derive(Debug)]
pub struct ShareRequestBuilder {
    owner: OwnerContext,
    space_id: SpaceId,
    provisioner: Arc<AssetProvisioner>,
    issuance: Arc<LinkIssuanceService>,
    step: WizardStep,
    lifecycle: Lifecycle,
    draft: ShareDraft,
    nda: AssetSlot,
    logo: AssetSlot,
    orphans: Vec<AssetId>,
}

impl ShareRequestBuilder {
    /// Start a wizard for `space_id`.
    pub fn new(
        owner: OwnerContext,
        space_id: SpaceId,
        provisioner: Arc<AssetProvisioner>,
        issuance: Arc<LinkIssuanceService>,
    ) -> Self {
        Self {
            owner,
            space_id,
            provisioner,
            issuance,
            step: WizardStep::Configuring,
            lifecycle: Lifecycle::Open,
            draft: ShareDraft::default(),
            nda: AssetSlot::Empty,
            logo: AssetSlot::Empty,
            orphans: Vec::new(),
        }
    }

    /// Current step.
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// The draft so far.
    pub fn draft(&self) -> &ShareDraft {
        &self.draft
    }

    /// Link produced by a successful submit.
    pub fn committed_link(&self) -> Option<ShareLinkId> {
        match self.lifecycle {
            Lifecycle::Committed(id) => Some(id),
            Lifecycle::Open | Lifecycle::Cancelled => None,
        }
    }

    /// Whether an asset of `kind` is staged or uploaded.
    pub fn has_asset(&self, kind: AssetKind) -> bool {
        self.slot(kind).is_attached()
    }

    /// Apply a draft mutation. Never validates.
    pub fn set_field(&mut self, field: ShareField) {
        self.draft.apply(field);
    }

    /// Hold asset bytes for upload at submission, replacing any earlier
    /// asset of the same kind.
    pub fn stage_asset(&mut self, kind: AssetKind, asset: StagedAsset) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.replace_slot(kind, AssetSlot::Staged(asset));
        Ok(())
    }

    /// Attach an asset that was already uploaded, replacing any earlier
    /// asset of the same kind.
    pub fn attach_uploaded(&mut self, asset: AssetRef) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.replace_slot(asset.kind, AssetSlot::Uploaded(asset.id));
        Ok(())
    }

    /// Detach the asset of `kind`.
    pub fn clear_asset(&mut self, kind: AssetKind) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.replace_slot(kind, AssetSlot::Empty);
        Ok(())
    }

    /// Check the Configuring step, folding a pending email into the list.
    pub fn validate_configuring(&mut self) -> Result<(), ValidationError> {
        self.draft.fold_pending_email();
        match self.draft.level() {
            SecurityLevel::Open => Ok(()),
            SecurityLevel::Password => self.require_password(),
            SecurityLevel::Whitelist => {
                self.require_password()?;
                if self.draft.has_whitelist_entry() {
                    Ok(())
                } else {
                    Err(ValidationError::EmptyWhitelist)
                }
            }
        }
    }

    /// Move to the next step.
    pub fn advance(&mut self) -> AppResult<WizardStep> {
        self.ensure_open()?;
        self.step = match self.step {
            WizardStep::Configuring => {
                self.validate_configuring()?;
                WizardStep::Branding
            }
            WizardStep::Branding => WizardStep::Review,
            WizardStep::Review => {
                return Err(WizardError::InvalidTransition {
                    action: "advance",
                    step: self.step,
                }
                .into());
            }
        };
        Ok(self.step)
    }

    /// Return to the previous step.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open()?;
        self.step = match self.step {
            WizardStep::Configuring => {
                return Err(WizardError::InvalidTransition {
                    action: "go back",
                    step: self.step,
                });
            }
            WizardStep::Branding => WizardStep::Configuring,
            WizardStep::Review => WizardStep::Branding,
        };
        Ok(self.step)
    }

    /// Upload staged assets, then issue the link.
    ///
    /// On failure the builder stays in Review with whatever uploads did
    /// succeed kept attached, so a retry does not upload them again.
    pub async fn submit(&mut self) -> AppResult<IssuedShareLink> {
        self.ensure_open()?;
        if self.step != WizardStep::Review {
            return Err(WizardError::InvalidTransition {
                action: "submit",
                step: self.step,
            }
            .into());
        }

        self.release_orphans().await;
        self.upload_staged().await?;

        let request = self.snapshot();
        let issued = self.issuance.issue(&self.owner, &request).await?;
        self.lifecycle = Lifecycle::Committed(issued.link.id);

        // Uploads the final link does not reference are orphans now.
        if !request.require_nda {
            self.replace_slot(AssetKind::Nda, AssetSlot::Empty);
        }
        self.release_orphans().await;

        info!(
            share_id = %issued.link.id,
            owner_id = %self.owner.owner_id,
            "Share request submitted"
        );
        Ok(issued)
    }

    /// Abandon the request and release every upload it holds.
    ///
    /// Cancelling twice is a no-op; cancelling after submit is an error.
    pub async fn cancel(&mut self) -> Result<(), WizardError> {
        match self.lifecycle {
            Lifecycle::Committed(_) => return Err(WizardError::AlreadyCommitted),
            Lifecycle::Cancelled => return Ok(()),
            Lifecycle::Open => {}
        }

        self.replace_slot(AssetKind::Nda, AssetSlot::Empty);
        self.replace_slot(AssetKind::Logo, AssetSlot::Empty);
        self.release_orphans().await;
        self.draft = ShareDraft::default();
        self.lifecycle = Lifecycle::Cancelled;

        info!(owner_id = %self.owner.owner_id, "Share request cancelled");
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        match self.lifecycle {
            Lifecycle::Open => Ok(()),
            Lifecycle::Committed(_) => Err(WizardError::AlreadyCommitted),
            Lifecycle::Cancelled => Err(WizardError::Cancelled),
        }
    }

    fn require_password(&self) -> Result<(), ValidationError> {
        if is_blank(self.draft.password.as_deref()) {
            Err(ValidationError::MissingPassword)
        } else {
            Ok(())
        }
    }

    fn slot(&self, kind: AssetKind) -> &AssetSlot {
        match kind {
            AssetKind::Nda => &self.nda,
            AssetKind::Logo => &self.logo,
        }
    }

    fn replace_slot(&mut self, kind: AssetKind, next: AssetSlot) {
        let slot = match kind {
            AssetKind::Nda => &mut self.nda,
            AssetKind::Logo => &mut self.logo,
        };
        let previous = std::mem::replace(slot, next);
        if let Some(id) = previous.uploaded() {
            if slot.uploaded() != Some(id) {
                self.orphans.push(id);
            }
        }
    }

    async fn release_orphans(&mut self) {
        let owner = self.owner.owner_id;
        for id in std::mem::take(&mut self.orphans) {
            if let Err(e) = self.provisioner.release(owner, id).await {
                warn!(asset_id = %id, error = %e, "Failed to release orphaned asset");
            }
        }
    }

    async fn upload_staged(&mut self) -> AppResult<()> {
        let owner = self.owner.owner_id;
        let nda = if self.draft.require_nda {
            self.nda.staged()
        } else {
            None
        };
        let logo = self.logo.staged();

        let (nda_result, logo_result) = tokio::join!(
            upload_one(&self.provisioner, owner, AssetKind::Nda, nda),
            upload_one(&self.provisioner, owner, AssetKind::Logo, logo),
        );

        let mut first_error: Option<UploadError> = None;
        for (kind, result) in [(AssetKind::Nda, nda_result), (AssetKind::Logo, logo_result)] {
            match result {
                Some(Ok(asset)) => self.replace_slot(kind, AssetSlot::Uploaded(asset.id)),
                Some(Err(e)) => {
                    warn!(kind = %kind, error = %e, "Staged asset upload failed");
                    first_error.get_or_insert(e);
                }
                None => {}
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn snapshot(&self) -> CompletedShareLinkRequest {
        let d = &self.draft;
        let branding = BrandingRequest {
            logo_ref: self.logo.uploaded(),
            accent_color: d.accent_color.clone(),
            welcome_message: d.welcome_message.clone(),
        };

        CompletedShareLinkRequest {
            space_id: self.space_id,
            label: d.label.clone(),
            security_level: d.level(),
            password: d.password.clone(),
            allowed_emails: d.allowed_emails.clone(),
            allowed_domains: d.allowed_domains.clone(),
            expires_at: d.expires_at,
            view_limit: d.view_limit,
            allow_downloads: d.allow_downloads,
            allow_qa: d.allow_qa,
            enable_watermark: d.enable_watermark,
            require_nda: d.require_nda,
            nda_document_ref: self.nda.uploaded().filter(|_| d.require_nda),
            branding: (branding != BrandingRequest::default()).then_some(branding),
        }
    }
}

async fn upload_one(
    provisioner: &AssetProvisioner,
    owner: OwnerId,
    kind: AssetKind,
    staged: Option<StagedAsset>,
) -> Option<Result<AssetRef, UploadError>> {
    let staged = staged?;
    Some(
        provisioner
            .upload(owner, kind, staged.content_type.as_deref(), staged.data)
            .await,
    )
}

#[cfg(test)]
mod tests {
    use spaceshare_core::error::ErrorKind;
    use spaceshare_entity::asset::AssetState;

    use super::*;
    use crate::asset::provisioner::tests::{PDF, PNG};
    use crate::testing::Harness;

    fn staged(data: &'static [u8]) -> StagedAsset {
        StagedAsset {
            content_type: None,
            data: Bytes::from_static(data),
        }
    }

    async fn asset_state(h: &Harness, id: AssetId) -> AssetState {
        h.stores.assets.find_by_id(id).await.unwrap().unwrap().state
    }

    #[tokio::test]
    async fn test_configuring_gate() {
        let h = Harness::new();
        let mut b = h.builder();

        b.set_field(ShareField::SecurityLevel(SecurityLevel::Password));
        let err = b.advance().unwrap_err();
        assert_eq!(err.code, Some("MISSING_PASSWORD"));
        assert_eq!(b.step(), WizardStep::Configuring);

        b.set_field(ShareField::SecurityLevel(SecurityLevel::Whitelist));
        b.set_field(ShareField::Password("pw".into()));
        assert_eq!(b.validate_configuring(), Err(ValidationError::EmptyWhitelist));

        b.set_field(ShareField::PendingEmail("  carol@partner.io ".into()));
        assert_eq!(b.validate_configuring(), Ok(()));
        assert_eq!(b.draft().allowed_emails, vec!["carol@partner.io".to_string()]);
        assert_eq!(b.draft().pending_email, None);

        b.set_field(ShareField::RequireNda(true));
        assert_eq!(b.advance().unwrap(), WizardStep::Branding);
        assert_eq!(b.advance().unwrap(), WizardStep::Review);
        assert!(b.advance().is_err());
        assert_eq!(b.back().unwrap(), WizardStep::Branding);
    }

    #[tokio::test]
    async fn test_submit_only_from_review() {
        let h = Harness::new();
        let mut b = h.builder();
        let err = b.submit().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.code, Some("INVALID_TRANSITION"));
    }

    #[tokio::test]
    async fn test_submit_uploads_staged_assets_and_issues() {
        let h = Harness::new();
        let mut b = h.builder();
        b.set_field(ShareField::RequireNda(true));
        b.stage_asset(AssetKind::Nda, staged(PDF)).unwrap();
        b.advance().unwrap();
        b.stage_asset(AssetKind::Logo, staged(PNG)).unwrap();
        b.set_field(ShareField::AccentColor(Some("#0af".into())));
        b.advance().unwrap();

        let issued = b.submit().await.unwrap();
        let link = issued.link;
        assert!(link.require_nda);
        let nda_id = link.nda_document_ref.unwrap();
        let logo_id = link.branding.as_ref().unwrap().logo_ref.unwrap();
        assert_eq!(asset_state(&h, nda_id).await, AssetState::Confirmed);
        assert_eq!(asset_state(&h, logo_id).await, AssetState::Confirmed);
        assert_eq!(b.committed_link(), Some(link.id));

        let err = b.submit().await.unwrap_err();
        assert_eq!(err.code, Some("ALREADY_COMMITTED"));
        assert_eq!(b.cancel().await, Err(WizardError::AlreadyCommitted));
    }

    #[tokio::test]
    async fn test_missing_nda_fails_at_submission_not_configuring() {
        let h = Harness::new();
        let mut b = h.builder();
        b.set_field(ShareField::RequireNda(true));
        b.advance().unwrap();
        b.advance().unwrap();

        let err = b.submit().await.unwrap_err();
        assert_eq!(err.code, Some("MISSING_NDA"));
        assert_eq!(b.step(), WizardStep::Review);
    }

    #[tokio::test]
    async fn test_failed_logo_upload_issues_nothing() {
        let h = Harness::new();
        let mut b = h.builder();
        b.set_field(ShareField::RequireNda(true));
        b.stage_asset(AssetKind::Nda, staged(PDF)).unwrap();
        b.stage_asset(AssetKind::Logo, staged(b"not an image")).unwrap();
        b.advance().unwrap();
        b.advance().unwrap();

        let err = b.submit().await.unwrap_err();
        assert_eq!(err.code, Some("WRONG_ASSET_TYPE"));
        assert!(h.links_for(h.space_id).await.is_empty());
        assert_eq!(b.step(), WizardStep::Review);
        assert!(b.committed_link().is_none());

        // Retry with a valid logo reuses the NDA that already uploaded.
        b.stage_asset(AssetKind::Logo, staged(PNG)).unwrap();
        let issued = b.submit().await.unwrap();
        assert_eq!(h.links_for(h.space_id).await.len(), 1);
        let trail = h.stores.audit_log.find_by_link(issued.link.id, 10).await.unwrap();
        assert_eq!(trail.len(), 1);
    }

    #[tokio::test]
    async fn test_replaced_upload_is_released_on_submit() {
        let h = Harness::new();
        let first = h
            .provisioner
            .upload(h.owner.owner_id, AssetKind::Logo, None, Bytes::from_static(PNG))
            .await
            .unwrap();
        let second = h
            .provisioner
            .upload(h.owner.owner_id, AssetKind::Logo, None, Bytes::from_static(PNG))
            .await
            .unwrap();

        let mut b = h.builder();
        b.attach_uploaded(first).unwrap();
        b.attach_uploaded(second).unwrap();
        b.advance().unwrap();
        b.advance().unwrap();
        let issued = b.submit().await.unwrap();

        assert_eq!(asset_state(&h, first.id).await, AssetState::Released);
        assert_eq!(asset_state(&h, second.id).await, AssetState::Confirmed);
        assert_eq!(issued.link.branding.unwrap().logo_ref, Some(second.id));
    }

    #[tokio::test]
    async fn test_unused_nda_released_after_commit() {
        let h = Harness::new();
        let nda = h
            .provisioner
            .upload(h.owner.owner_id, AssetKind::Nda, None, Bytes::from_static(PDF))
            .await
            .unwrap();

        let mut b = h.builder();
        b.attach_uploaded(nda).unwrap();
        b.advance().unwrap();
        b.advance().unwrap();
        let issued = b.submit().await.unwrap();

        assert!(!issued.link.require_nda);
        assert_eq!(asset_state(&h, nda.id).await, AssetState::Released);
    }

    #[tokio::test]
    async fn test_cancel_releases_uploads() {
        let h = Harness::new();
        let nda = h
            .provisioner
            .upload(h.owner.owner_id, AssetKind::Nda, None, Bytes::from_static(PDF))
            .await
            .unwrap();
        let old_logo = h
            .provisioner
            .upload(h.owner.owner_id, AssetKind::Logo, None, Bytes::from_static(PNG))
            .await
            .unwrap();

        let mut b = h.builder();
        b.attach_uploaded(nda).unwrap();
        b.attach_uploaded(old_logo).unwrap();
        b.stage_asset(AssetKind::Logo, staged(PNG)).unwrap();
        b.advance().unwrap();

        b.cancel().await.unwrap();
        b.cancel().await.unwrap();

        assert_eq!(asset_state(&h, nda.id).await, AssetState::Released);
        assert_eq!(asset_state(&h, old_logo.id).await, AssetState::Released);
        assert_eq!(b.advance().unwrap_err().code, Some("CANCELLED"));
        assert!(h.links_for(h.space_id).await.is_empty());
    }
}
