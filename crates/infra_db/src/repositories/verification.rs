//! Verification repository
//!
//! Read-only counts over the generated and upstream tables.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Repository for the verifier's queries
#[derive(Debug, Clone)]
pub struct VerificationRepository {
    pool: PgPool,
}

impl VerificationRepository {
    /// Creates a new VerificationRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Number of rows in `aum_investor_daily`
    pub async fn count_investor_rows(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM aum_investor_daily")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Number of rows in `investor_holdings`
    pub async fn count_holdings(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM investor_holdings")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Distinct dates present in `aum_investor_daily`, ascending
    pub async fn investor_row_dates(&self) -> Result<Vec<NaiveDate>, DatabaseError> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT DISTINCT date FROM aum_investor_daily ORDER BY date ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(dates)
    }
}
