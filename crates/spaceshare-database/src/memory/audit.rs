//! In-memory audit trail.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::ShareLinkId;
use spaceshare_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use crate::store::AuditLogStore;

/// Append-only audit entries held in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLogStore {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl MemoryAuditLogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLogStore for MemoryAuditLogStore {
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<()> {
        self.entries.write().await.push(AuditLogEntry {
            id: entry.id,
            link_id: entry.link_id,
            action: entry.action.clone(),
            actor: entry.actor.clone(),
            details: entry.details.clone(),
            ip_address: entry.ip_address.clone(),
            created_at: entry.created_at,
        });
        Ok(())
    }

    async fn find_by_link(
        &self,
        link_id: ShareLinkId,
        limit: u32,
    ) -> AppResult<Vec<AuditLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|e| e.link_id == Some(link_id))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use spaceshare_core::events::{DomainEvent, ShareEvent};

    use super::*;

    #[tokio::test]
    async fn test_find_by_link_returns_newest_first() {
        let store = MemoryAuditLogStore::new();
        let link = ShareLinkId::new();

        for count in 1..=3 {
            let event = DomainEvent::share(
                None,
                ShareEvent::Viewed {
                    share_id: link,
                    view_count: count,
                },
            );
            store.append(&CreateAuditLogEntry::from_event(&event)).await.unwrap();
        }

        let entries = store.find_by_link(link, 2).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].details.as_ref().unwrap()["event"]["view_count"], 3);
    }
}
