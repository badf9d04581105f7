//! In-memory NDA acceptance store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::ShareLinkId;
use spaceshare_entity::share::NdaAcceptance;

use crate::store::{AcceptanceWrite, NdaAcceptanceStore};

/// Acceptances keyed by `(link_id, visitor_identity)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryNdaAcceptanceStore {
    acceptances: Arc<DashMap<(ShareLinkId, String), NdaAcceptance>>,
}

impl MemoryNdaAcceptanceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NdaAcceptanceStore for MemoryNdaAcceptanceStore {
    async fn record(
        &self,
        link_id: ShareLinkId,
        visitor_identity: &str,
    ) -> AppResult<AcceptanceWrite> {
        match self.acceptances.entry((link_id, visitor_identity.to_string())) {
            Entry::Occupied(existing) => Ok(AcceptanceWrite::Existing(existing.get().clone())),
            Entry::Vacant(slot) => {
                let acceptance = NdaAcceptance {
                    link_id,
                    visitor_identity: visitor_identity.to_string(),
                    accepted_at: Utc::now(),
                };
                slot.insert(acceptance.clone());
                Ok(AcceptanceWrite::Created(acceptance))
            }
        }
    }

    async fn find(
        &self,
        link_id: ShareLinkId,
        visitor_identity: &str,
    ) -> AppResult<Option<NdaAcceptance>> {
        Ok(self
            .acceptances
            .get(&(link_id, visitor_identity.to_string()))
            .map(|a| a.value().clone()))
    }

    async fn count_for_link(&self, link_id: ShareLinkId) -> AppResult<u64> {
        Ok(self
            .acceptances
            .iter()
            .filter(|a| a.key().0 == link_id)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_is_idempotent() {
        let store = MemoryNdaAcceptanceStore::new();
        let link = ShareLinkId::new();

        let first = store.record(link, "alice@acme.com").await.unwrap();
        assert!(first.is_new());
        let second = store.record(link, "alice@acme.com").await.unwrap();
        assert!(!second.is_new());
        assert_eq!(first.acceptance().accepted_at, second.acceptance().accepted_at);

        store.record(link, "bob@acme.com").await.unwrap();
        assert_eq!(store.count_for_link(link).await.unwrap(), 2);
        assert_eq!(store.count_for_link(ShareLinkId::new()).await.unwrap(), 0);
    }
}
