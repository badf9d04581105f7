//! Schema migrations for the PostgreSQL backend.
//!
//! The embedded migrations create `share_links`, `nda_acceptances`,
//! `assets`, and `audit_log`. The in-memory backend has no schema and
//! never calls this.

use sqlx::PgPool;
use tracing::{debug, info};

use spaceshare_core::error::{AppError, ErrorKind};
use spaceshare_core::result::AppResult;

/// Apply every pending SpaceShare migration. Already-applied versions are
/// skipped, so this is safe to run on each server start.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let migrator = sqlx::migrate!("../../migrations");
    debug!(available = migrator.iter().count(), "Applying SpaceShare schema migrations");

    migrator
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to apply SpaceShare schema: {e}"),
                e,
            )
        })?;

    info!("SpaceShare schema is up to date");
    Ok(())
}
