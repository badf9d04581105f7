//! Audit log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use spaceshare_core::error::{AppError, ErrorKind};
use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::ShareLinkId;
use spaceshare_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use crate::store::AuditLogStore;

/// Repository for audit log operations.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogStore for AuditLogRepository {
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<()> {
        sqlx::query(
            r#"INSERT INTO audit_log (id, link_id, action, actor, details, ip_address, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(entry.id)
        .bind(entry.link_id)
        .bind(&entry.action)
        .bind(&entry.actor)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create audit entry", e))?;
        Ok(())
    }

    async fn find_by_link(
        &self,
        link_id: ShareLinkId,
        limit: u32,
    ) -> AppResult<Vec<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log WHERE link_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(link_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list audit entries", e))
    }
}
