//! Audit sink trait for structured share events.

use async_trait::async_trait;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Destination for domain events that must leave an audit trail.
///
/// Emission is fire-and-record: callers log a failed emit and carry on,
/// so an unavailable sink never changes an issuance or access decision.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Record a single event.
    async fn emit(&self, event: &DomainEvent) -> AppResult<()>;
}
