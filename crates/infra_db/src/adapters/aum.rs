//! PostgreSQL AUM Adapter
//!
//! This module provides the internal (database) adapter for the AUM domain,
//! implementing its four ports on top of the repositories.
//!
//! # Overview
//!
//! The `PostgresAumAdapter` serves as the bridge between the domain layer's
//! port interfaces and the database layer. It:
//!
//! - Translates port calls into repository queries
//! - Converts database rows into domain maps and records
//! - Translates `DatabaseError` into `PortError`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresAumAdapter;
//! use domain_aum::ReferencePort;
//!
//! let adapter = PostgresAumAdapter::new(pool);
//! let dates = adapter.nav_dates().await?;
//! ```

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, AgentId, DomainPort, FundId, HealthCheckResult, HealthCheckable,
    InvestorId, PortError,
};
use domain_aum::{
    AgentAssignments, AumWritePort, BatchWriteError, DailyAumAggregate, DailyInputPort,
    DayGapTable, EffectiveHolding, FundParams, InvestorAumRow, NavsForDate, ReferencePort,
    VerificationPort,
};

use crate::repositories::aum_writer::{NewAumDaily, NewInvestorAum};
use crate::repositories::{
    AumWriteRepository, DailyInputRepository, ReferenceRepository, VerificationRepository,
};

const ADAPTER_ID: &str = "postgres-aum-adapter";

/// PostgreSQL-backed implementation of the AUM ports
///
/// All repositories share one pool; its capacity bounds the number of
/// concurrent statements across date workers.
#[derive(Debug, Clone)]
pub struct PostgresAumAdapter {
    reference: ReferenceRepository,
    daily: DailyInputRepository,
    writer: AumWriteRepository,
    verification: VerificationRepository,
    pool: PgPool,
}

impl PostgresAumAdapter {
    /// Creates a new PostgreSQL AUM adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            reference: ReferenceRepository::new(pool.clone()),
            daily: DailyInputRepository::new(pool.clone()),
            writer: AumWriteRepository::new(pool.clone()),
            verification: VerificationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns the underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresAumAdapter {}

#[async_trait]
impl HealthCheckable for PostgresAumAdapter {
    /// Performs a simple SELECT 1 query to verify the pool is operational
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl ReferencePort for PostgresAumAdapter {
    #[instrument(skip(self))]
    async fn nav_dates(&self) -> Result<Vec<NaiveDate>, PortError> {
        self.reference
            .nav_dates()
            .await
            .map_err(|e| e.into_port_error("load_nav_dates"))
    }

    #[instrument(skip(self))]
    async fn completed_dates(&self) -> Result<BTreeSet<NaiveDate>, PortError> {
        let dates = self
            .reference
            .completed_dates()
            .await
            .map_err(|e| e.into_port_error("load_completed_dates"))?;

        Ok(dates.into_iter().collect())
    }

    #[instrument(skip(self))]
    async fn funds(&self) -> Result<HashMap<FundId, FundParams>, PortError> {
        let rows = self
            .reference
            .funds()
            .await
            .map_err(|e| e.into_port_error("load_funds"))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    FundId::new(row.id),
                    FundParams::new(row.management_fee_rate, row.valuation_basis),
                )
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn agent_assignments(&self) -> Result<AgentAssignments, PortError> {
        let rows = self
            .reference
            .current_agents()
            .await
            .map_err(|e| e.into_port_error("load_agent_investors"))?;

        let current: HashMap<InvestorId, AgentId> = rows
            .into_iter()
            .map(|row| (InvestorId::new(row.investor_id), AgentId::new(row.agent_id)))
            .collect();
        Ok(AgentAssignments::from_current(current))
    }

    #[instrument(skip(self))]
    async fn day_gaps(&self) -> Result<DayGapTable, PortError> {
        let rows = self
            .reference
            .day_gaps()
            .await
            .map_err(|e| e.into_port_error("load_day_gaps"))?;

        Ok(DayGapTable::from_gaps(
            rows.into_iter()
                .map(|row| (FundId::new(row.fund_id), row.date, row.days)),
        ))
    }
}

#[async_trait]
impl DailyInputPort for PostgresAumAdapter {
    #[instrument(skip(self), fields(%date))]
    async fn navs_for_date(&self, date: NaiveDate) -> Result<NavsForDate, PortError> {
        let rows = self
            .daily
            .navs_for_date(date)
            .await
            .map_err(|e| e.into_port_error("load_navs"))?;

        Ok(rows
            .into_iter()
            .map(|row| (FundId::new(row.fund_id), row.nav_per_unit))
            .collect())
    }

    #[instrument(skip(self), fields(%date))]
    async fn effective_holdings(&self, date: NaiveDate) -> Result<Vec<EffectiveHolding>, PortError> {
        let rows = self
            .daily
            .effective_holdings(date)
            .await
            .map_err(|e| e.into_port_error("load_holdings"))?;

        debug!(count = rows.len(), "Loaded effective holdings");
        Ok(rows
            .into_iter()
            .map(|row| EffectiveHolding {
                investor_id: InvestorId::new(row.investor_id),
                fund_id: FundId::new(row.fund_id),
                units: row.units_after,
            })
            .collect())
    }
}

#[async_trait]
impl AumWritePort for PostgresAumAdapter {
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert_investor_rows(&self, rows: &[InvestorAumRow]) -> Result<u64, BatchWriteError> {
        let payload: Vec<NewInvestorAum> = rows.iter().map(row_to_new).collect();

        self.writer
            .insert_investor_rows(&payload)
            .await
            .map_err(|e| {
                BatchWriteError::new(
                    e.index,
                    e.inserted,
                    e.source.into_port_error("insert_aum_investor_daily"),
                )
            })
    }

    #[instrument(skip(self, aggregate), fields(date = %aggregate.date))]
    async fn upsert_daily_aggregate(&self, aggregate: &DailyAumAggregate) -> Result<(), PortError> {
        let daily = NewAumDaily {
            date: aggregate.date,
            aum_value: aggregate.aum_value,
            management_fee: aggregate.management_fee,
            created_at: aggregate.created_at,
            updated_at: aggregate.updated_at,
        };

        self.writer
            .upsert_daily(&daily)
            .await
            .map_err(|e| e.into_port_error("upsert_aum_daily"))
    }
}

#[async_trait]
impl VerificationPort for PostgresAumAdapter {
    async fn count_investor_rows(&self) -> Result<i64, PortError> {
        self.verification
            .count_investor_rows()
            .await
            .map_err(|e| e.into_port_error("count_aum_investor_daily"))
    }

    async fn count_holdings(&self) -> Result<i64, PortError> {
        self.verification
            .count_holdings()
            .await
            .map_err(|e| e.into_port_error("count_investor_holdings"))
    }

    async fn investor_row_dates(&self) -> Result<BTreeSet<NaiveDate>, PortError> {
        let dates = self
            .verification
            .investor_row_dates()
            .await
            .map_err(|e| e.into_port_error("load_aum_dates"))?;

        Ok(dates.into_iter().collect())
    }
}

/// Converts a domain row into the insert payload
fn row_to_new(row: &InvestorAumRow) -> NewInvestorAum {
    NewInvestorAum {
        investor_id: row.investor_id.as_str().to_string(),
        agent_id: row.agent_id.get(),
        fund_id: row.fund_id.get(),
        date: row.date,
        units: row.units,
        nav_per_unit: row.nav_per_unit,
        aum_value: row.aum_value,
        days: row.days,
        management_fee: row.management_fee,
    }
}
