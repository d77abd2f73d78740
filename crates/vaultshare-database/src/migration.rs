//! Schema migrations embedded from the workspace `migrations/` directory.

use sqlx::SqlitePool;
use tracing::info;

use vaultshare_core::error::{AppError, ErrorKind};

/// Bring the schema for files, chunks, and versions up to date. Safe to run
/// on every start; applied migrations are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    let migrator = sqlx::migrate!("../../migrations");
    let known = migrator.iter().count();

    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, format!("Migration failed: {e}"), e)
    })?;

    info!(migrations = known, "Schema up to date");
    Ok(())
}
