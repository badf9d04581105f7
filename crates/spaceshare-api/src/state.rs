//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use spaceshare_core::config::AppConfig;
use spaceshare_core::traits::StorageProvider;
use spaceshare_database::Stores;
use spaceshare_service::{
    AccessEvaluator, AssetProvisioner, LinkIssuanceService, NdaService, ShareService,
    VisitorAssetService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Persistence stores (PostgreSQL or in-memory)
    pub stores: Stores,
    /// Asset byte storage
    pub storage: Arc<dyn StorageProvider>,

    // ── Services ─────────────────────────────────────────────
    /// NDA and logo uploads
    pub provisioner: Arc<AssetProvisioner>,
    /// Link issuance
    pub issuance: Arc<LinkIssuanceService>,
    /// Visitor access evaluation
    pub access: Arc<AccessEvaluator>,
    /// NDA acceptance
    pub nda: Arc<NdaService>,
    /// NDA document and logo delivery
    pub content: Arc<VisitorAssetService>,
    /// Owner link management
    pub shares: Arc<ShareService>,
}
