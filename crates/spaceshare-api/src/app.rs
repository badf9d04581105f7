//! Application builder: wires services into state and state into the router.

use std::sync::Arc;

use axum::Router;

use spaceshare_auth::PasswordHasher;
use spaceshare_core::config::AppConfig;
use spaceshare_core::traits::{AuditSink, StorageProvider};
use spaceshare_database::Stores;
use spaceshare_service::{
    AccessEvaluator, AssetProvisioner, AuditLogSink, LinkIssuanceService, NdaService,
    ShareService, VisitorAssetService,
};

use crate::router::build_router;
use crate::state::AppState;

impl AppState {
    /// Construct every service over the given stores and storage provider.
    pub fn new(config: AppConfig, stores: Stores, storage: Arc<dyn StorageProvider>) -> Self {
        let audit: Arc<dyn AuditSink> = Arc::new(AuditLogSink::new(stores.audit_log.clone()));
        let hasher = Arc::new(PasswordHasher::new());

        let provisioner = Arc::new(AssetProvisioner::new(
            storage.clone(),
            stores.assets.clone(),
            audit.clone(),
            &config.storage,
        ));
        let issuance = Arc::new(LinkIssuanceService::new(
            stores.share_links.clone(),
            provisioner.clone(),
            hasher.clone(),
            audit.clone(),
            &config.share,
        ));
        let access = Arc::new(AccessEvaluator::new(
            stores.share_links.clone(),
            stores.nda_acceptances.clone(),
            hasher,
            audit.clone(),
        ));
        let nda = Arc::new(NdaService::new(
            access.clone(),
            stores.nda_acceptances.clone(),
            audit.clone(),
        ));
        let content = Arc::new(VisitorAssetService::new(access.clone(), provisioner.clone()));
        let shares = Arc::new(ShareService::new(
            stores.share_links.clone(),
            stores.nda_acceptances.clone(),
            audit,
        ));

        Self {
            config: Arc::new(config),
            stores,
            storage,
            provisioner,
            issuance,
            access,
            nda,
            content,
            shares,
        }
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}
