//! In-memory share link store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use tracing::debug;

use spaceshare_core::error::AppError;
use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::{OwnerId, ShareLinkId, SpaceId};
use spaceshare_entity::share::{CreateShareLink, LinkStatus, ShareLink};

use super::MemoryTables;
use crate::store::{ShareLinkStore, ViewCounterSnapshot, asset_unavailable};

/// Share links keyed by ID, with a unique token index.
#[derive(Debug, Clone, Default)]
pub struct MemoryShareLinkStore {
    tables: MemoryTables,
}

impl MemoryShareLinkStore {
    /// Create an empty store with its own tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store over tables shared with a [`super::MemoryAssetStore`].
    pub fn with_tables(tables: MemoryTables) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl ShareLinkStore for MemoryShareLinkStore {
    async fn create(&self, data: &CreateShareLink) -> AppResult<ShareLink> {
        let _references = self.tables.references.lock().await;
        for asset_id in data.asset_refs() {
            let confirmed = self
                .tables
                .assets
                .get(&asset_id)
                .is_some_and(|a| a.is_confirmed());
            if !confirmed {
                return Err(asset_unavailable(asset_id));
            }
        }

        let id = ShareLinkId::new();
        match self.tables.tokens.entry(data.token.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict("Share link token already exists"));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let link = data.clone().into_link(id, Utc::now());
        self.tables.links.insert(id, link.clone());
        debug!(share_id = %id, "Share link stored in memory");
        Ok(link)
    }

    async fn find_by_id(&self, id: ShareLinkId) -> AppResult<Option<ShareLink>> {
        Ok(self.tables.links.get(&id).map(|l| l.value().clone()))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        let Some(id) = self.tables.tokens.get(token).map(|e| *e.value()) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn find_by_space(
        &self,
        space_id: SpaceId,
        owner: OwnerId,
    ) -> AppResult<Vec<ShareLink>> {
        let mut links: Vec<ShareLink> = self
            .tables
            .links
            .iter()
            .filter(|l| l.space_id == space_id && l.created_by == owner)
            .map(|l| l.value().clone())
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn counter_snapshot(&self, id: ShareLinkId) -> AppResult<Option<ViewCounterSnapshot>> {
        Ok(self.tables.links.get(&id).map(|l| ViewCounterSnapshot {
            view_count: l.view_count,
            view_limit: l.view_limit,
            active: l.status == LinkStatus::Active,
        }))
    }

    async fn compare_and_increment(&self, id: ShareLinkId, expected: u32) -> AppResult<bool> {
        let Some(mut link) = self.tables.links.get_mut(&id) else {
            return Ok(false);
        };
        if link.status != LinkStatus::Active || link.view_count != expected {
            return Ok(false);
        }
        if matches!(link.view_limit, Some(limit) if link.view_count >= limit) {
            return Ok(false);
        }
        link.view_count += 1;
        Ok(true)
    }

    async fn increment_unlimited(&self, id: ShareLinkId) -> AppResult<Option<u32>> {
        let Some(mut link) = self.tables.links.get_mut(&id) else {
            return Ok(None);
        };
        if link.status != LinkStatus::Active || link.view_limit.is_some() {
            return Ok(None);
        }
        link.view_count = link.view_count.saturating_add(1);
        Ok(Some(link.view_count))
    }

    async fn revoke(&self, id: ShareLinkId, at: DateTime<Utc>) -> AppResult<bool> {
        let Some(mut link) = self.tables.links.get_mut(&id) else {
            return Ok(false);
        };
        if link.status == LinkStatus::Revoked {
            return Ok(false);
        }
        link.status = LinkStatus::Revoked;
        link.revoked_at = Some(at);
        Ok(true)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
