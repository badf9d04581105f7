//! Link issuance: the commit point of a share request.

use std::sync::Arc;

use tracing::info;

use spaceshare_auth::{LinkTokenGenerator, PasswordHasher};
use spaceshare_core::config::ShareConfig;
use spaceshare_core::error::AppError;
use spaceshare_core::events::{DomainEvent, ShareEvent};
use spaceshare_core::result::AppResult;
use spaceshare_core::traits::AuditSink;
use spaceshare_core::types::id::AssetId;
use spaceshare_database::ShareLinkStore;
use spaceshare_entity::asset::AssetKind;
use spaceshare_entity::share::{CreateShareLink, IssuedShareLink};

use super::request::CompletedShareLinkRequest;
use super::validation::{ValidationError, validate_request};
use crate::asset::AssetProvisioner;
use crate::audit;
use crate::context::OwnerContext;

/// Validates completed requests and persists them as share links.
#[derive(Debug, Clone)]
pub struct LinkIssuanceService {
    share_links: Arc<dyn ShareLinkStore>,
    provisioner: Arc<AssetProvisioner>,
    hasher: Arc<PasswordHasher>,
    tokens: LinkTokenGenerator,
    audit: Arc<dyn AuditSink>,
    public_base_url: String,
}

impl LinkIssuanceService {
    /// Creates a new issuance service.
    pub fn new(
        share_links: Arc<dyn ShareLinkStore>,
        provisioner: Arc<AssetProvisioner>,
        hasher: Arc<PasswordHasher>,
        audit: Arc<dyn AuditSink>,
        config: &ShareConfig,
    ) -> Self {
        Self {
            share_links,
            provisioner,
            hasher,
            tokens: LinkTokenGenerator::new(config.token_bytes),
            audit,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Canonical visitor URL for a token.
    pub fn share_url(&self, token: &str) -> String {
        format!("{}/s/{}", self.public_base_url, token)
    }

    /// Validate `request` and persist it as a new active link.
    ///
    /// Nothing is written unless every check passes.
    pub async fn issue(
        &self,
        owner: &OwnerContext,
        request: &CompletedShareLinkRequest,
    ) -> AppResult<IssuedShareLink> {
        let policy = validate_request(request)?;

        if let Some(nda_ref) = request.nda_document_ref {
            self.expect_asset(owner, nda_ref, AssetKind::Nda, ValidationError::MissingNda)
                .await?;
        }
        if let Some(logo_ref) = policy.branding.as_ref().and_then(|b| b.logo_ref) {
            self.expect_asset(owner, logo_ref, AssetKind::Logo, ValidationError::UnresolvedLogo)
                .await?;
        }

        let password_hash = policy
            .password
            .as_deref()
            .map(|p| self.hasher.hash_password(p))
            .transpose()?;

        let token = self.tokens.generate();
        let data = CreateShareLink {
            space_id: request.space_id,
            created_by: owner.owner_id,
            token: token.clone(),
            label: policy.label,
            security_level: request.security_level,
            password_hash,
            allowed_emails: policy.allowed_emails,
            allowed_domains: policy.allowed_domains,
            expires_at: request.expires_at,
            view_limit: request.view_limit,
            allow_downloads: request.allow_downloads,
            allow_qa: request.allow_qa,
            enable_watermark: request.enable_watermark,
            require_nda: request.require_nda,
            nda_document_ref: request.nda_document_ref,
            branding: policy.branding,
        };

        let link = self.share_links.create(&data).await?;

        info!(
            share_id = %link.id,
            space_id = %link.space_id,
            owner_id = %owner.owner_id,
            security_level = %link.security_level,
            require_nda = link.require_nda,
            view_limit = ?link.view_limit,
            "Share link issued"
        );

        audit::record(
            self.audit.as_ref(),
            DomainEvent::share(
                owner.actor(),
                ShareEvent::Created {
                    share_id: link.id,
                    space_id: link.space_id,
                    security_level: link.security_level.to_string(),
                    require_nda: link.require_nda,
                    view_limit: link.view_limit,
                },
            )
            .with_ip(owner.ip_address.clone()),
        )
        .await;

        Ok(IssuedShareLink {
            url: self.share_url(&token),
            token,
            link,
        })
    }

    async fn expect_asset(
        &self,
        owner: &OwnerContext,
        id: AssetId,
        kind: AssetKind,
        unresolved: ValidationError,
    ) -> AppResult<()> {
        match self.provisioner.resolve(owner.owner_id, id).await? {
            None => Err(unresolved.into()),
            Some(asset) if asset.kind != kind => {
                Err(AppError::from(ValidationError::WrongAssetType(id.to_string())))
            }
            Some(_) => Ok(()),
        }
    }
}
