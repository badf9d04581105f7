//! Shared fixtures for unit tests.

use std::sync::Arc;

use spaceshare_auth::PasswordHasher;
use spaceshare_core::config::{ShareConfig, StorageConfig};
use spaceshare_core::traits::AuditSink;
use spaceshare_core::types::id::{OwnerId, SpaceId};
use spaceshare_database::Stores;
use spaceshare_entity::share::{SecurityLevel, ShareLink};
use spaceshare_storage::MemoryStorageProvider;

use crate::asset::AssetProvisioner;
use crate::audit::AuditLogSink;
use crate::context::OwnerContext;
use crate::share::{
    AccessEvaluator, CompletedShareLinkRequest, LinkIssuanceService, NdaService, ShareRequestBuilder,
    ShareService, VisitorAssetService,
};

/// Every service wired over in-memory stores.
pub(crate) struct Harness {
    pub stores: Stores,
    pub owner: OwnerContext,
    pub space_id: SpaceId,
    pub provisioner: Arc<AssetProvisioner>,
    pub issuance: Arc<LinkIssuanceService>,
    pub access: Arc<AccessEvaluator>,
    pub nda: NdaService,
    pub content: VisitorAssetService,
    pub shares: ShareService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_stores(Stores::memory())
    }

    pub fn with_stores(stores: Stores) -> Self {
        let audit: Arc<dyn AuditSink> = Arc::new(AuditLogSink::new(stores.audit_log.clone()));
        let hasher = Arc::new(PasswordHasher::new());

        let provisioner = Arc::new(AssetProvisioner::new(
            Arc::new(MemoryStorageProvider::new()),
            stores.assets.clone(),
            audit.clone(),
            &StorageConfig::default(),
        ));
        let issuance = Arc::new(LinkIssuanceService::new(
            stores.share_links.clone(),
            provisioner.clone(),
            hasher.clone(),
            audit.clone(),
            &ShareConfig {
                public_base_url: "http://share.test/".into(),
                ..ShareConfig::default()
            },
        ));
        let access = Arc::new(AccessEvaluator::new(
            stores.share_links.clone(),
            stores.nda_acceptances.clone(),
            hasher,
            audit.clone(),
        ));
        let nda = NdaService::new(
            access.clone(),
            stores.nda_acceptances.clone(),
            audit.clone(),
        );
        let content = VisitorAssetService::new(access.clone(), provisioner.clone());
        let shares = ShareService::new(
            stores.share_links.clone(),
            stores.nda_acceptances.clone(),
            audit,
        );

        Self {
            stores,
            owner: OwnerContext::new(OwnerId::new(), Some("127.0.0.1".into())),
            space_id: SpaceId::new(),
            provisioner,
            issuance,
            access,
            nda,
            content,
            shares,
        }
    }

    pub fn builder(&self) -> ShareRequestBuilder {
        ShareRequestBuilder::new(
            self.owner.clone(),
            self.space_id,
            self.provisioner.clone(),
            self.issuance.clone(),
        )
    }

    pub async fn links_for(&self, space_id: SpaceId) -> Vec<ShareLink> {
        self.stores
            .share_links
            .find_by_space(space_id, self.owner.owner_id)
            .await
            .unwrap()
    }
}

/// An Open link request with every option off.
pub(crate) fn open_request() -> CompletedShareLinkRequest {
    CompletedShareLinkRequest {
        space_id: SpaceId::new(),
        label: None,
        security_level: SecurityLevel::Open,
        password: None,
        allowed_emails: Vec::new(),
        allowed_domains: Vec::new(),
        expires_at: None,
        view_limit: None,
        allow_downloads: true,
        allow_qa: false,
        enable_watermark: true,
        require_nda: false,
        nda_document_ref: None,
        branding: None,
    }
}
