//! Write-side schema migrations
//!
//! The bundled migration creates `aum_investor_daily` with its
//! (investor_id, fund_id, date) key and `aum_daily` keyed by date. Re-runs
//! rely on that key for insert-ignore, so it is created here rather than
//! assumed.

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

use crate::error::DatabaseError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies any pending write-side migrations
///
/// # Errors
///
/// Returns `DatabaseError::MigrationFailed` if a migration cannot be applied
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    info!(count = MIGRATOR.iter().count(), "Running database migrations");

    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

    info!("Database migrations applied");
    Ok(())
}
