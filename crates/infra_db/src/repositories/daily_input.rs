//! Per-date input repository
//!
//! NAVs published on a date and the effective holdings as of that date.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Repository for the inputs of a single date
#[derive(Debug, Clone)]
pub struct DailyInputRepository {
    pool: PgPool,
}

impl DailyInputRepository {
    /// Creates a new DailyInputRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// NAVs of every fund that published on `date`
    pub async fn navs_for_date(&self, date: NaiveDate) -> Result<Vec<NavRow>, DatabaseError> {
        let navs = sqlx::query_as::<_, NavRow>(
            r#"
            SELECT fund_id, nav_per_unit::float8 AS nav_per_unit
            FROM fund_navs
            WHERE date = $1
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(navs)
    }

    /// Latest positive holding per (investor, fund) as of `date`
    ///
    /// Ranks snapshots by transaction date then holding id, both descending.
    pub async fn effective_holdings(&self, date: NaiveDate) -> Result<Vec<HoldingRow>, DatabaseError> {
        let holdings = sqlx::query_as::<_, HoldingRow>(
            r#"
            WITH ranked_holdings AS (
                SELECT
                    ih.investor_id,
                    ih.fund_id,
                    ih.units_after,
                    ROW_NUMBER() OVER (
                        PARTITION BY ih.investor_id, ih.fund_id
                        ORDER BY t.transaction_date DESC, ih.id DESC
                    ) AS rn
                FROM investor_holdings ih
                INNER JOIN transactions t ON t.id = ih.transaction_id
                WHERE t.transaction_date <= $1
            )
            SELECT investor_id, fund_id, units_after::float8 AS units_after
            FROM ranked_holdings
            WHERE rn = 1 AND units_after > 0
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(holdings)
    }
}

/// Database row for a NAV on the requested date
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NavRow {
    pub fund_id: i32,
    pub nav_per_unit: f64,
}

/// Database row for an effective holding
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HoldingRow {
    pub investor_id: String,
    pub fund_id: i32,
    pub units_after: f64,
}
