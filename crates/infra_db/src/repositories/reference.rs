//! Reference data repository
//!
//! This module provides the read-once queries run before any date is
//! dispatched: NAV dates, completed dates, fund parameters, current agent
//! assignments and the per-fund day-gap table.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Repository for data that is constant across the dates of a run
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    /// Creates a new ReferenceRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinct NAV dates, ascending
    pub async fn nav_dates(&self) -> Result<Vec<NaiveDate>, DatabaseError> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT DISTINCT date
            FROM fund_navs
            ORDER BY date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(dates)
    }

    /// Dates that already have a row in `aum_daily`
    pub async fn completed_dates(&self) -> Result<Vec<NaiveDate>, DatabaseError> {
        let dates = sqlx::query_scalar::<_, NaiveDate>("SELECT date FROM aum_daily")
            .fetch_all(&self.pool)
            .await?;

        Ok(dates)
    }

    /// Fee parameters of every fund
    ///
    /// Null rates and bases read as zero; a zero basis later falls back to 365.
    pub async fn funds(&self) -> Result<Vec<FundRow>, DatabaseError> {
        let funds = sqlx::query_as::<_, FundRow>(
            r#"
            SELECT
                id,
                COALESCE(management_fee_rate, 0)::float8 AS management_fee_rate,
                COALESCE(valuation_basis, 0)::int4 AS valuation_basis
            FROM funds
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(funds)
    }

    /// The assignment with the latest effective date per investor
    pub async fn current_agents(&self) -> Result<Vec<AgentAssignmentRow>, DatabaseError> {
        let agents = sqlx::query_as::<_, AgentAssignmentRow>(
            r#"
            SELECT investor_id, agent_id
            FROM (
                SELECT
                    investor_id,
                    agent_id,
                    ROW_NUMBER() OVER (
                        PARTITION BY investor_id
                        ORDER BY effective_date DESC
                    ) AS rn
                FROM agent_investors
            ) sub
            WHERE rn = 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(agents)
    }

    /// Days since the previous NAV for every (fund, NAV date)
    ///
    /// A fund's first NAV gets one day.
    pub async fn day_gaps(&self) -> Result<Vec<DayGapRow>, DatabaseError> {
        let gaps = sqlx::query_as::<_, DayGapRow>(
            r#"
            SELECT
                fund_id,
                date,
                COALESCE(
                    (date - LAG(date) OVER (PARTITION BY fund_id ORDER BY date))::int4,
                    1
                ) AS days
            FROM fund_navs
            ORDER BY fund_id, date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(gaps)
    }
}

/// Database row for fund fee parameters
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FundRow {
    pub id: i32,
    pub management_fee_rate: f64,
    pub valuation_basis: i32,
}

/// Database row for a resolved agent assignment
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentAssignmentRow {
    pub investor_id: String,
    pub agent_id: i32,
}

/// Database row for one day gap
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DayGapRow {
    pub fund_id: i32,
    pub date: NaiveDate,
    pub days: i32,
}
