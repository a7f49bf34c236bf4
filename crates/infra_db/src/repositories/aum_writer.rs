//! AUM write repository
//!
//! Investor rows are insert-once: a chunk goes out as a single
//! `INSERT ... SELECT FROM UNNEST(...)` with `ON CONFLICT DO NOTHING`, so a
//! re-run of a partly written date never duplicates a row. The daily
//! aggregate is upserted and acts as the completion marker of its date.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::warn;

use crate::error::DatabaseError;

const INSERT_CHUNK_SQL: &str = r#"
    INSERT INTO aum_investor_daily (
        investor_id, agent_id, fund_id, date, units,
        nav_per_unit, aum_value, days, management_fee
    )
    SELECT * FROM UNNEST(
        $1::text[], $2::int4[], $3::int4[], $4::date[], $5::float8[],
        $6::float8[], $7::float8[], $8::int4[], $9::float8[]
    )
    ON CONFLICT (investor_id, fund_id, date) DO NOTHING
"#;

const INSERT_ROW_SQL: &str = r#"
    INSERT INTO aum_investor_daily (
        investor_id, agent_id, fund_id, date, units,
        nav_per_unit, aum_value, days, management_fee
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (investor_id, fund_id, date) DO NOTHING
"#;

/// Repository for `aum_investor_daily` and `aum_daily`
#[derive(Debug, Clone)]
pub struct AumWriteRepository {
    pool: PgPool,
}

impl AumWriteRepository {
    /// Creates a new AumWriteRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a chunk of investor rows in one round trip
    ///
    /// The statement is atomic. When it fails the chunk is replayed row by
    /// row to find the offending row; rows before it stay committed and
    /// its index is returned with the error.
    ///
    /// # Returns
    ///
    /// The number of rows actually inserted (conflicts excluded)
    pub async fn insert_investor_rows(
        &self,
        rows: &[NewInvestorAum],
    ) -> Result<u64, ChunkInsertError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let columns = ChunkColumns::from_rows(rows);
        let result = sqlx::query(INSERT_CHUNK_SQL)
            .bind(columns.investor_ids)
            .bind(columns.agent_ids)
            .bind(columns.fund_ids)
            .bind(columns.dates)
            .bind(columns.units)
            .bind(columns.nav_per_units)
            .bind(columns.aum_values)
            .bind(columns.days)
            .bind(columns.management_fees)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected()),
            Err(chunk_error) => {
                warn!(
                    rows = rows.len(),
                    error = %chunk_error,
                    "Chunk insert failed, replaying row by row"
                );
                self.replay_rows(rows, chunk_error).await
            }
        }
    }

    async fn replay_rows(
        &self,
        rows: &[NewInvestorAum],
        chunk_error: sqlx::Error,
    ) -> Result<u64, ChunkInsertError> {
        let mut inserted = 0;
        for (index, row) in rows.iter().enumerate() {
            match self.insert_one(row).await {
                Ok(n) => inserted += n,
                Err(source) => {
                    return Err(ChunkInsertError {
                        index,
                        inserted,
                        source,
                    })
                }
            }
        }

        // Every row went through on its own; the chunk failure was transient
        // or caused by the chunk as a whole.
        warn!(error = %chunk_error, "Row-by-row replay succeeded after chunk failure");
        Ok(inserted)
    }

    async fn insert_one(&self, row: &NewInvestorAum) -> Result<u64, DatabaseError> {
        let done = sqlx::query(INSERT_ROW_SQL)
            .bind(&row.investor_id)
            .bind(row.agent_id)
            .bind(row.fund_id)
            .bind(row.date)
            .bind(row.units)
            .bind(row.nav_per_unit)
            .bind(row.aum_value)
            .bind(row.days)
            .bind(row.management_fee)
            .execute(&self.pool)
            .await?;

        Ok(done.rows_affected())
    }

    /// Inserts the aggregate of a date or refreshes its totals
    ///
    /// On conflict `created_at` is kept and `updated_at` moves forward.
    pub async fn upsert_daily(&self, daily: &NewAumDaily) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO aum_daily (date, aum_value, management_fee, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (date) DO UPDATE SET
                aum_value = EXCLUDED.aum_value,
                management_fee = EXCLUDED.management_fee,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(daily.date)
        .bind(daily.aum_value)
        .bind(daily.management_fee)
        .bind(daily.created_at)
        .bind(daily.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// A chunk insert that stopped at `index`
#[derive(Debug)]
pub struct ChunkInsertError {
    /// Position of the failing row in the chunk
    pub index: usize,
    /// Rows inserted before the failure
    pub inserted: u64,
    pub source: DatabaseError,
}

/// Insert payload for `aum_investor_daily`
#[derive(Debug, Clone)]
pub struct NewInvestorAum {
    pub investor_id: String,
    pub agent_id: i32,
    pub fund_id: i32,
    pub date: NaiveDate,
    pub units: f64,
    pub nav_per_unit: f64,
    pub aum_value: f64,
    pub days: i32,
    pub management_fee: f64,
}

/// Upsert payload for `aum_daily`
#[derive(Debug, Clone)]
pub struct NewAumDaily {
    pub date: NaiveDate,
    pub aum_value: f64,
    pub management_fee: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column-major view of a chunk for the UNNEST insert
#[derive(Debug, Default)]
struct ChunkColumns {
    investor_ids: Vec<String>,
    agent_ids: Vec<i32>,
    fund_ids: Vec<i32>,
    dates: Vec<NaiveDate>,
    units: Vec<f64>,
    nav_per_units: Vec<f64>,
    aum_values: Vec<f64>,
    days: Vec<i32>,
    management_fees: Vec<f64>,
}

impl ChunkColumns {
    fn from_rows(rows: &[NewInvestorAum]) -> Self {
        let mut columns = ChunkColumns::with_capacity(rows.len());
        for row in rows {
            columns.investor_ids.push(row.investor_id.clone());
            columns.agent_ids.push(row.agent_id);
            columns.fund_ids.push(row.fund_id);
            columns.dates.push(row.date);
            columns.units.push(row.units);
            columns.nav_per_units.push(row.nav_per_unit);
            columns.aum_values.push(row.aum_value);
            columns.days.push(row.days);
            columns.management_fees.push(row.management_fee);
        }
        columns
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            investor_ids: Vec::with_capacity(n),
            agent_ids: Vec::with_capacity(n),
            fund_ids: Vec::with_capacity(n),
            dates: Vec::with_capacity(n),
            units: Vec::with_capacity(n),
            nav_per_units: Vec::with_capacity(n),
            aum_values: Vec::with_capacity(n),
            days: Vec::with_capacity(n),
            management_fees: Vec::with_capacity(n),
        }
    }
}
