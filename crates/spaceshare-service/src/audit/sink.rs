//! Store-backed audit sink.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use spaceshare_core::events::DomainEvent;
use spaceshare_core::result::AppResult;
use spaceshare_core::traits::AuditSink;
use spaceshare_database::AuditLogStore;
use spaceshare_entity::audit::CreateAuditLogEntry;

/// Appends every event to the audit-log store and mirrors it to the log.
#[derive(Debug, Clone)]
pub struct AuditLogSink {
    store: Arc<dyn AuditLogStore>,
}

impl AuditLogSink {
    /// Creates a sink writing to `store`.
    pub fn new(store: Arc<dyn AuditLogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditSink for AuditLogSink {
    async fn emit(&self, event: &DomainEvent) -> AppResult<()> {
        let entry = CreateAuditLogEntry::from_event(event);
        info!(
            action = %entry.action,
            link_id = ?entry.link_id,
            actor = ?entry.actor,
            "Audit event"
        );
        self.store.append(&entry).await
    }
}

/// Emit an event, logging instead of failing when the sink is unavailable.
pub async fn record(sink: &dyn AuditSink, event: DomainEvent) {
    if let Err(e) = sink.emit(&event).await {
        warn!(
            action = event.payload.action(),
            error = %e,
            "Failed to record audit event"
        );
    }
}
