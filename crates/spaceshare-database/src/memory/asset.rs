//! In-memory asset record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;

use spaceshare_core::error::AppError;
use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::AssetId;
use spaceshare_entity::asset::{Asset, AssetState, CreateAsset};

use super::MemoryTables;
use crate::store::{AssetRelease, AssetStore};

/// Asset records keyed by ID.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    tables: MemoryTables,
}

impl MemoryAssetStore {
    /// Create an empty store with its own tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store over tables shared with a [`super::MemoryShareLinkStore`].
    pub fn with_tables(tables: MemoryTables) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn create(&self, data: &CreateAsset) -> AppResult<Asset> {
        match self.tables.assets.entry(data.id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Asset {} already exists",
                data.id
            ))),
            Entry::Vacant(slot) => {
                let asset = Asset {
                    id: data.id,
                    kind: data.kind,
                    owner_id: data.owner_id,
                    content_type: data.content_type.clone(),
                    size_bytes: data.size_bytes,
                    storage_path: data.storage_path.clone(),
                    state: AssetState::Confirmed,
                    created_at: Utc::now(),
                    released_at: None,
                };
                slot.insert(asset.clone());
                Ok(asset)
            }
        }
    }

    async fn find_by_id(&self, id: AssetId) -> AppResult<Option<Asset>> {
        Ok(self.tables.assets.get(&id).map(|a| a.value().clone()))
    }

    async fn release_unreferenced(
        &self,
        id: AssetId,
        at: DateTime<Utc>,
    ) -> AppResult<AssetRelease> {
        let _references = self.tables.references.lock().await;
        if self.tables.links.iter().any(|l| l.references_asset(id)) {
            return Ok(AssetRelease::InUse);
        }

        let Some(mut asset) = self.tables.assets.get_mut(&id) else {
            return Ok(AssetRelease::Unchanged);
        };
        if asset.state != AssetState::Confirmed {
            return Ok(AssetRelease::Unchanged);
        }
        asset.state = AssetState::Released;
        asset.released_at = Some(at);
        Ok(AssetRelease::Released(asset.clone()))
    }
}
