//! NDA acceptance repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use spaceshare_core::error::{AppError, ErrorKind};
use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::ShareLinkId;
use spaceshare_entity::share::NdaAcceptance;

use crate::store::{AcceptanceWrite, NdaAcceptanceStore};

/// Repository for NDA acceptance records.
#[derive(Debug, Clone)]
pub struct NdaAcceptanceRepository {
    pool: PgPool,
}

impl NdaAcceptanceRepository {
    /// Create a new NDA acceptance repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NdaAcceptanceStore for NdaAcceptanceRepository {
    async fn record(
        &self,
        link_id: ShareLinkId,
        visitor_identity: &str,
    ) -> AppResult<AcceptanceWrite> {
        let inserted = sqlx::query_as::<_, NdaAcceptance>(
            r#"INSERT INTO nda_acceptances (link_id, visitor_identity)
               VALUES ($1, $2)
               ON CONFLICT (link_id, visitor_identity) DO NOTHING
               RETURNING *"#,
        )
        .bind(link_id)
        .bind(visitor_identity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record NDA acceptance", e)
        })?;

        if let Some(acceptance) = inserted {
            return Ok(AcceptanceWrite::Created(acceptance));
        }

        self.find(link_id, visitor_identity)
            .await?
            .map(AcceptanceWrite::Existing)
            .ok_or_else(|| AppError::database("NDA acceptance vanished after conflict"))
    }

    async fn find(
        &self,
        link_id: ShareLinkId,
        visitor_identity: &str,
    ) -> AppResult<Option<NdaAcceptance>> {
        sqlx::query_as::<_, NdaAcceptance>(
            "SELECT * FROM nda_acceptances WHERE link_id = $1 AND visitor_identity = $2",
        )
        .bind(link_id)
        .bind(visitor_identity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find NDA acceptance", e))
    }

    async fn count_for_link(&self, link_id: ShareLinkId) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM nda_acceptances WHERE link_id = $1")
                .bind(link_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count NDA acceptances", e)
                })?;
        Ok(count.max(0) as u64)
    }
}
