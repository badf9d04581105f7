//! Asset repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use spaceshare_core::error::{AppError, ErrorKind};
use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::AssetId;
use spaceshare_entity::asset::{Asset, CreateAsset};

use crate::store::{AssetRelease, AssetStore};

/// Repository for uploaded asset records.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    /// Create a new asset repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetStore for AssetRepository {
    async fn create(&self, data: &CreateAsset) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>(
            r#"INSERT INTO assets (id, kind, owner_id, content_type, size_bytes, storage_path)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(data.id)
        .bind(data.kind)
        .bind(data.owner_id)
        .bind(&data.content_type)
        .bind(data.size_bytes)
        .bind(&data.storage_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create asset", e))
    }

    async fn find_by_id(&self, id: AssetId) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find asset", e))
    }

    async fn release_unreferenced(
        &self,
        id: AssetId,
        at: DateTime<Utc>,
    ) -> AppResult<AssetRelease> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))?;

        // The row lock conflicts with the FOR SHARE taken by link creation.
        let confirmed: Option<bool> =
            sqlx::query_scalar("SELECT state = 'confirmed' FROM assets WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock asset", e))?;
        if confirmed != Some(true) {
            return Ok(AssetRelease::Unchanged);
        }

        let referenced: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(
                   SELECT 1 FROM share_links WHERE nda_document_ref = $1 OR logo_ref = $1
               )"#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check asset references", e))?;
        if referenced {
            return Ok(AssetRelease::InUse);
        }

        let asset = sqlx::query_as::<_, Asset>(
            r#"UPDATE assets SET state = 'released', released_at = $2
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release asset", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit asset release", e))?;

        Ok(AssetRelease::Released(asset))
    }
}
