//! Process-local store implementations backed by `DashMap`.
//!
//! Suitable for single-node deployments and tests. Each map entry is
//! guarded by its shard lock, which is what makes the counter CAS and the
//! acceptance insert atomic.
//!
//! Link creation and asset release touch both the link and the asset
//! tables, so they share [`MemoryTables`] and serialize on its reference
//! lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use spaceshare_core::types::id::{AssetId, ShareLinkId};
use spaceshare_entity::asset::Asset;
use spaceshare_entity::share::ShareLink;

pub mod asset;
pub mod audit;
pub mod nda;
pub mod share_link;

pub use asset::MemoryAssetStore;
pub use audit::MemoryAuditLogStore;
pub use nda::MemoryNdaAcceptanceStore;
pub use share_link::MemoryShareLinkStore;

/// Link and asset tables shared by [`MemoryShareLinkStore`] and
/// [`MemoryAssetStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub(crate) links: Arc<DashMap<ShareLinkId, ShareLink>>,
    pub(crate) tokens: Arc<DashMap<String, ShareLinkId>>,
    pub(crate) assets: Arc<DashMap<AssetId, Asset>>,
    /// Held while a link is inserted or an asset is released.
    pub(crate) references: Arc<Mutex<()>>,
}

impl MemoryTables {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }
}
