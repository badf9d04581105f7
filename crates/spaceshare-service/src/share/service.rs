//! Owner-facing link management: lookup, listing, and revocation.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use spaceshare_core::error::AppError;
use spaceshare_core::events::{DomainEvent, ShareEvent};
use spaceshare_core::result::AppResult;
use spaceshare_core::traits::AuditSink;
use spaceshare_core::types::id::{ShareLinkId, SpaceId};
use spaceshare_database::{NdaAcceptanceStore, ShareLinkStore};
use spaceshare_entity::share::ShareLink;

use crate::audit;
use crate::context::OwnerContext;

/// Manages an owner's issued links.
#[derive(Debug, Clone)]
pub struct ShareService {
    share_links: Arc<dyn ShareLinkStore>,
    nda_acceptances: Arc<dyn NdaAcceptanceStore>,
    audit: Arc<dyn AuditSink>,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        share_links: Arc<dyn ShareLinkStore>,
        nda_acceptances: Arc<dyn NdaAcceptanceStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            share_links,
            nda_acceptances,
            audit,
        }
    }

    /// Fetch a link the owner issued. Other owners' links read as missing.
    pub async fn get(&self, ctx: &OwnerContext, id: ShareLinkId) -> AppResult<ShareLink> {
        self.share_links
            .find_by_id(id)
            .await?
            .filter(|l| l.created_by == ctx.owner_id)
            .ok_or_else(|| AppError::not_found(format!("Share link {id} not found")))
    }

    /// Number of distinct visitors who accepted the link's NDA.
    pub async fn nda_acceptance_count(&self, ctx: &OwnerContext, id: ShareLinkId) -> AppResult<u64> {
        let link = self.get(ctx, id).await?;
        self.nda_acceptances.count_for_link(link.id).await
    }

    /// The owner's links for a space, newest first.
    pub async fn list_for_space(
        &self,
        ctx: &OwnerContext,
        space_id: SpaceId,
    ) -> AppResult<Vec<ShareLink>> {
        self.share_links.find_by_space(space_id, ctx.owner_id).await
    }

    /// Revoke a link. Revoking twice is a no-op returning the same record.
    pub async fn revoke(&self, ctx: &OwnerContext, id: ShareLinkId) -> AppResult<ShareLink> {
        let link = self.get(ctx, id).await?;
        if link.is_revoked() {
            return Ok(link);
        }

        if self.share_links.revoke(id, Utc::now()).await? {
            info!(share_id = %id, owner_id = %ctx.owner_id, "Share link revoked");
            audit::record(
                self.audit.as_ref(),
                DomainEvent::share(ctx.actor(), ShareEvent::Revoked { share_id: id })
                    .with_ip(ctx.ip_address.clone()),
            )
            .await;
        }

        self.get(ctx, id).await
    }
}
