//! Share link repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use spaceshare_core::error::{AppError, ErrorKind};
use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::{AssetId, OwnerId, ShareLinkId, SpaceId};
use spaceshare_entity::share::{Branding, CreateShareLink, LinkStatus, SecurityLevel, ShareLink};

use crate::store::{ShareLinkStore, ViewCounterSnapshot, asset_unavailable};

/// Flat `share_links` row. Branding is stored as three nullable columns.
#[derive(Debug, FromRow)]
struct ShareLinkRow {
    id: ShareLinkId,
    space_id: SpaceId,
    created_by: OwnerId,
    token: String,
    label: Option<String>,
    security_level: SecurityLevel,
    password_hash: Option<String>,
    allowed_emails: Vec<String>,
    allowed_domains: Vec<String>,
    expires_at: Option<DateTime<Utc>>,
    view_limit: Option<i32>,
    view_count: i32,
    allow_downloads: bool,
    allow_qa: bool,
    enable_watermark: bool,
    require_nda: bool,
    nda_document_ref: Option<AssetId>,
    logo_ref: Option<AssetId>,
    accent_color: Option<String>,
    welcome_message: Option<String>,
    status: LinkStatus,
    created_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<ShareLinkRow> for ShareLink {
    fn from(row: ShareLinkRow) -> Self {
        let branding = Branding {
            logo_ref: row.logo_ref,
            accent_color: row.accent_color,
            welcome_message: row.welcome_message,
        };

        Self {
            id: row.id,
            space_id: row.space_id,
            created_by: row.created_by,
            token: row.token,
            label: row.label,
            security_level: row.security_level,
            password_hash: row.password_hash,
            allowed_emails: row.allowed_emails.into_iter().collect(),
            allowed_domains: row.allowed_domains.into_iter().collect(),
            expires_at: row.expires_at,
            view_limit: row.view_limit.map(|v| v.max(0) as u32),
            view_count: row.view_count.max(0) as u32,
            allow_downloads: row.allow_downloads,
            allow_qa: row.allow_qa,
            enable_watermark: row.enable_watermark,
            require_nda: row.require_nda,
            nda_document_ref: row.nda_document_ref,
            branding: (!branding.is_empty()).then_some(branding),
            status: row.status,
            created_at: row.created_at,
            revoked_at: row.revoked_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CounterRow {
    view_count: i32,
    view_limit: Option<i32>,
    status: LinkStatus,
}

fn to_db_count(value: u32) -> AppResult<i32> {
    i32::try_from(value)
        .map_err(|_| AppError::validation(format!("View count {value} is out of range")))
}

/// Repository for share link persistence and the atomic view counter.
#[derive(Debug, Clone)]
pub struct ShareLinkRepository {
    pool: PgPool,
}

impl ShareLinkRepository {
    /// Create a new share link repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareLinkStore for ShareLinkRepository {
    async fn create(&self, data: &CreateShareLink) -> AppResult<ShareLink> {
        let view_limit = data.view_limit.map(to_db_count).transpose()?;
        let branding = data.branding.clone().unwrap_or_default();
        let emails: Vec<String> = data.allowed_emails.iter().cloned().collect();
        let domains: Vec<String> = data.allowed_domains.iter().cloned().collect();

        let asset_refs = data.asset_refs();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))?;

        // Share-lock the referenced assets so a concurrent release waits for
        // this insert, and sees it, before deciding.
        if !asset_refs.is_empty() {
            let ids: Vec<Uuid> = asset_refs.iter().map(|id| id.into_uuid()).collect();
            let confirmed: Vec<AssetId> = sqlx::query_scalar(
                "SELECT id FROM assets WHERE id = ANY($1) AND state = 'confirmed' FOR SHARE",
            )
            .bind(&ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to lock referenced assets", e)
            })?;
            if let Some(missing) = asset_refs.iter().find(|id| !confirmed.contains(id)) {
                return Err(asset_unavailable(*missing));
            }
        }

        let row = sqlx::query_as::<_, ShareLinkRow>(
            r#"INSERT INTO share_links (
                id, space_id, created_by, token, label, security_level, password_hash,
                allowed_emails, allowed_domains, expires_at, view_limit,
                allow_downloads, allow_qa, enable_watermark, require_nda, nda_document_ref,
                logo_ref, accent_color, welcome_message
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *"#,
        )
        .bind(ShareLinkId::new())
        .bind(data.space_id)
        .bind(data.created_by)
        .bind(&data.token)
        .bind(&data.label)
        .bind(data.security_level)
        .bind(&data.password_hash)
        .bind(&emails)
        .bind(&domains)
        .bind(data.expires_at)
        .bind(view_limit)
        .bind(data.allow_downloads)
        .bind(data.allow_qa)
        .bind(data.enable_watermark)
        .bind(data.require_nda)
        .bind(data.nda_document_ref)
        .bind(branding.logo_ref)
        .bind(&branding.accent_color)
        .bind(&branding.welcome_message)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create share link", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit share link", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: ShareLinkId) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLinkRow>("SELECT * FROM share_links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Into::into))
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share link", e))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLinkRow>("SELECT * FROM share_links WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Into::into))
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find share link by token", e)
            })
    }

    async fn find_by_space(
        &self,
        space_id: SpaceId,
        owner: OwnerId,
    ) -> AppResult<Vec<ShareLink>> {
        sqlx::query_as::<_, ShareLinkRow>(
            "SELECT * FROM share_links WHERE space_id = $1 AND created_by = $2 ORDER BY created_at DESC",
        )
        .bind(space_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(Into::into).collect())
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list share links", e))
    }

    async fn counter_snapshot(&self, id: ShareLinkId) -> AppResult<Option<ViewCounterSnapshot>> {
        let row = sqlx::query_as::<_, CounterRow>(
            "SELECT view_count, view_limit, status FROM share_links WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read view counter", e))?;

        Ok(row.map(|r| ViewCounterSnapshot {
            view_count: r.view_count.max(0) as u32,
            view_limit: r.view_limit.map(|v| v.max(0) as u32),
            active: r.status == LinkStatus::Active,
        }))
    }

    async fn compare_and_increment(&self, id: ShareLinkId, expected: u32) -> AppResult<bool> {
        let expected = to_db_count(expected)?;
        let result = sqlx::query(
            r#"UPDATE share_links SET view_count = view_count + 1
               WHERE id = $1 AND view_count = $2 AND status = 'active'
                 AND (view_limit IS NULL OR view_count < view_limit)"#,
        )
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to increment view counter", e)
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn increment_unlimited(&self, id: ShareLinkId) -> AppResult<Option<u32>> {
        let count: Option<i32> = sqlx::query_scalar(
            r#"UPDATE share_links SET view_count = view_count + 1
               WHERE id = $1 AND status = 'active' AND view_limit IS NULL
               RETURNING view_count"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to increment view counter", e)
        })?;

        Ok(count.map(|c| c.max(0) as u32))
    }

    async fn revoke(&self, id: ShareLinkId, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE share_links SET status = 'revoked', revoked_at = $2 WHERE id = $1 AND status = 'active'",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke share link", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Database health check failed", e))
    }
}
