//! Backend-agnostic store traits and the [`Stores`] bundle.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use spaceshare_core::config::{DatabaseConfig, DatabaseProvider};
use spaceshare_core::error::AppError;
use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::{AssetId, OwnerId, ShareLinkId, SpaceId};
use spaceshare_entity::asset::{Asset, CreateAsset};
use spaceshare_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use spaceshare_entity::share::{CreateShareLink, NdaAcceptance, ShareLink};

use crate::connection::DatabasePool;
use crate::memory::{
    MemoryAssetStore, MemoryAuditLogStore, MemoryNdaAcceptanceStore, MemoryShareLinkStore,
    MemoryTables,
};
use crate::migration::run_migrations;
use crate::repositories::{
    AssetRepository, AuditLogRepository, NdaAcceptanceRepository, ShareLinkRepository,
};

/// Versioned read of a link's admission counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewCounterSnapshot {
    /// Admitted views so far.
    pub view_count: u32,
    /// Configured limit, if any.
    pub view_limit: Option<u32>,
    /// Whether the link is still active.
    pub active: bool,
}

/// Result of an idempotent NDA acceptance write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptanceWrite {
    /// This call created the record.
    Created(NdaAcceptance),
    /// A record already existed and was left untouched.
    Existing(NdaAcceptance),
}

impl AcceptanceWrite {
    /// The stored record.
    pub fn acceptance(&self) -> &NdaAcceptance {
        match self {
            Self::Created(a) | Self::Existing(a) => a,
        }
    }

    /// Whether this call created the record.
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Outcome of [`AssetStore::release_unreferenced`].
#[derive(Debug, Clone)]
pub enum AssetRelease {
    /// This call moved the asset to released.
    Released(Asset),
    /// A share link references the asset; nothing changed.
    InUse,
    /// The asset is unknown or already released.
    Unchanged,
}

/// Error returned when a link would reference an asset that is not confirmed.
pub(crate) fn asset_unavailable(id: AssetId) -> AppError {
    AppError::conflict(format!("Asset {id} is no longer available")).with_code("ASSET_RELEASED")
}

/// Persistence for share links.
///
/// `create` must be a single atomic write, and must fail with an
/// `ASSET_RELEASED` conflict unless every asset the link references is
/// confirmed at the moment of the write. It is mutually exclusive with
/// [`AssetStore::release_unreferenced`]. The counter methods are the only
/// mutation path for `view_count`; neither ever lets the count pass the
/// stored limit or move on a revoked link.
#[async_trait]
pub trait ShareLinkStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new link.
    async fn create(&self, data: &CreateShareLink) -> AppResult<ShareLink>;

    /// Find a link by ID.
    async fn find_by_id(&self, id: ShareLinkId) -> AppResult<Option<ShareLink>>;

    /// Find a link by visitor token.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>>;

    /// List links an owner issued for a space, newest first.
    async fn find_by_space(&self, space_id: SpaceId, owner: OwnerId)
    -> AppResult<Vec<ShareLink>>;

    /// Read the counter state.
    async fn counter_snapshot(&self, id: ShareLinkId) -> AppResult<Option<ViewCounterSnapshot>>;

    /// Set `view_count` to `expected + 1` iff it still equals `expected`, the
    /// link is active, and the new value stays within the limit.
    ///
    /// Returns `true` when the write happened.
    async fn compare_and_increment(&self, id: ShareLinkId, expected: u32) -> AppResult<bool>;

    /// Unconditionally add one view to an active, unlimited link.
    ///
    /// Returns the new count, or `None` if the link is gone, revoked, or limited.
    async fn increment_unlimited(&self, id: ShareLinkId) -> AppResult<Option<u32>>;

    /// Mark a link revoked. Returns `true` when this call changed the status.
    async fn revoke(&self, id: ShareLinkId, at: DateTime<Utc>) -> AppResult<bool>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Persistence for NDA acceptances.
#[async_trait]
pub trait NdaAcceptanceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Record an acceptance once per `(link_id, visitor_identity)`.
    async fn record(&self, link_id: ShareLinkId, visitor_identity: &str)
    -> AppResult<AcceptanceWrite>;

    /// Look up an acceptance.
    async fn find(
        &self,
        link_id: ShareLinkId,
        visitor_identity: &str,
    ) -> AppResult<Option<NdaAcceptance>>;

    /// Number of distinct visitors who accepted a link's NDA.
    async fn count_for_link(&self, link_id: ShareLinkId) -> AppResult<u64>;
}

/// Persistence for uploaded asset records.
#[async_trait]
pub trait AssetStore: Send + Sync + std::fmt::Debug + 'static {
    /// Record a confirmed upload.
    async fn create(&self, data: &CreateAsset) -> AppResult<Asset>;

    /// Find an asset by ID, in any state.
    async fn find_by_id(&self, id: AssetId) -> AppResult<Option<Asset>>;

    /// Move a confirmed asset to released unless a share link references
    /// it as its NDA document or logo.
    ///
    /// The reference check and the state change are one atomic step with
    /// respect to [`ShareLinkStore::create`].
    async fn release_unreferenced(&self, id: AssetId, at: DateTime<Utc>)
    -> AppResult<AssetRelease>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditLogStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append an entry.
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<()>;

    /// Most recent entries for a link, newest first.
    async fn find_by_link(&self, link_id: ShareLinkId, limit: u32)
    -> AppResult<Vec<AuditLogEntry>>;
}

/// One implementation of every store, shared across services.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Share links.
    pub share_links: Arc<dyn ShareLinkStore>,
    /// NDA acceptances.
    pub nda_acceptances: Arc<dyn NdaAcceptanceStore>,
    /// Asset records.
    pub assets: Arc<dyn AssetStore>,
    /// Audit trail.
    pub audit_log: Arc<dyn AuditLogStore>,
}

impl Stores {
    /// Process-local stores.
    pub fn memory() -> Self {
        let tables = MemoryTables::new();
        Self {
            share_links: Arc::new(MemoryShareLinkStore::with_tables(tables.clone())),
            nda_acceptances: Arc::new(MemoryNdaAcceptanceStore::new()),
            assets: Arc::new(MemoryAssetStore::with_tables(tables)),
            audit_log: Arc::new(MemoryAuditLogStore::new()),
        }
    }

    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: &DatabasePool) -> Self {
        let pool = pool.pool().clone();
        Self {
            share_links: Arc::new(ShareLinkRepository::new(pool.clone())),
            nda_acceptances: Arc::new(NdaAcceptanceRepository::new(pool.clone())),
            assets: Arc::new(AssetRepository::new(pool.clone())),
            audit_log: Arc::new(AuditLogRepository::new(pool)),
        }
    }

    /// Build the stores selected by configuration, connecting and migrating
    /// PostgreSQL when it is the chosen provider.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Memory => {
                info!("Using in-memory stores (single node, not durable)");
                Ok(Self::memory())
            }
            DatabaseProvider::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(&pool))
            }
        }
    }
}
