//! AUM Domain Ports
//!
//! The pipeline talks to its store only through these traits:
//!
//! - **ReferencePort**: the five read-once loads done before dispatch
//! - **DailyInputPort**: the per-date NAV and holdings loads
//! - **AumWritePort**: chunk inserts and the aggregate upsert
//! - **VerificationPort**: the counts behind the coverage report
//!
//! `infra_db` provides the PostgreSQL adapter; `test_utils` provides an
//! in-memory store with the same conflict semantics.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, FundId, PortError};

use crate::agent::AgentAssignments;
use crate::error::BatchWriteError;
use crate::fund::FundParams;
use crate::holding::EffectiveHolding;
use crate::nav::{DayGapTable, NavsForDate};
use crate::record::{DailyAumAggregate, InvestorAumRow};

/// Data that stays constant across the dates of a run
#[async_trait]
pub trait ReferencePort: DomainPort {
    /// Distinct dates with at least one NAV, ascending
    async fn nav_dates(&self) -> Result<Vec<NaiveDate>, PortError>;

    /// Dates that already have a daily aggregate
    async fn completed_dates(&self) -> Result<BTreeSet<NaiveDate>, PortError>;

    /// Fee parameters per fund
    async fn funds(&self) -> Result<HashMap<FundId, FundParams>, PortError>;

    /// Current agent per investor
    async fn agent_assignments(&self) -> Result<AgentAssignments, PortError>;

    /// Accrual days per (fund, NAV date)
    async fn day_gaps(&self) -> Result<DayGapTable, PortError>;
}

/// Inputs that change with the date
#[async_trait]
pub trait DailyInputPort: DomainPort {
    /// NAVs published on `date`
    async fn navs_for_date(&self, date: NaiveDate) -> Result<NavsForDate, PortError>;

    /// Positive effective holdings as of `date`
    async fn effective_holdings(&self, date: NaiveDate) -> Result<Vec<EffectiveHolding>, PortError>;
}

/// Writes produced by the pipeline
#[async_trait]
pub trait AumWritePort: DomainPort {
    /// Inserts one chunk, ignoring rows whose key already exists
    ///
    /// Returns the number of rows actually inserted.
    async fn insert_investor_rows(&self, rows: &[InvestorAumRow]) -> Result<u64, BatchWriteError>;

    /// Inserts or refreshes the aggregate for its date
    ///
    /// On conflict the totals and `updated_at` are overwritten and
    /// `created_at` is kept.
    async fn upsert_daily_aggregate(&self, aggregate: &DailyAumAggregate) -> Result<(), PortError>;
}

/// Read-only counts used by the verifier
#[async_trait]
pub trait VerificationPort: DomainPort {
    async fn count_investor_rows(&self) -> Result<i64, PortError>;

    async fn count_holdings(&self) -> Result<i64, PortError>;

    /// Distinct dates that have at least one investor row
    async fn investor_row_dates(&self) -> Result<BTreeSet<NaiveDate>, PortError>;
}

/// Everything the AUM pipeline needs from a store
pub trait AumStore: ReferencePort + DailyInputPort + AumWritePort + VerificationPort {}

impl<T> AumStore for T where T: ReferencePort + DailyInputPort + AumWritePort + VerificationPort {}
