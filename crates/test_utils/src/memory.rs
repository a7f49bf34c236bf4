//! In-memory AUM store
//!
//! Implements every AUM port over plain collections with the same conflict
//! rules as PostgreSQL: investor rows are insert-once per
//! (investor, fund, date) and the daily aggregate is an upsert that keeps
//! `created_at`. Faults can be injected per date to exercise failure paths.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{AgentId, DomainPort, FundId, InvestorId, PortError};
use domain_aum::{
    select_effective_holdings, AgentAssignment, AgentAssignments, AumWritePort, BatchWriteError,
    DailyAumAggregate, DailyInputPort, DayGapTable, EffectiveHolding, FundParams, HoldingEvent,
    InvestorAumRow, NavPoint, NavsForDate, ReferencePort, VerificationPort,
};

type RowKey = (InvestorId, FundId, NaiveDate);

/// Failures to inject into a store
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Dates whose NAV load fails
    pub fail_navs: HashSet<NaiveDate>,
    /// (date, investor) whose investor row insert fails
    pub fail_rows: HashSet<(NaiveDate, InvestorId)>,
    /// Dates whose aggregate upsert fails
    pub fail_aggregates: HashSet<NaiveDate>,
    /// Delay before the holdings of a date are returned
    pub holding_delays: HashMap<NaiveDate, Duration>,
    /// Makes the fund load fail
    pub fail_funds: bool,
}

#[derive(Debug, Default)]
struct Written {
    investor_rows: BTreeMap<RowKey, InvestorAumRow>,
    daily: BTreeMap<NaiveDate, DailyAumAggregate>,
    insert_calls: usize,
}

/// Upstream data plus the rows written so far
#[derive(Debug, Default)]
pub struct InMemoryAumStore {
    navs: Vec<NavPoint>,
    funds: HashMap<FundId, FundParams>,
    agents: Vec<AgentAssignment>,
    holdings: Vec<HoldingEvent>,
    written: Mutex<Written>,
    faults: Mutex<Faults>,
}

impl InMemoryAumStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a NAV
    pub fn with_nav(mut self, fund_id: i32, date: NaiveDate, nav_per_unit: f64) -> Self {
        self.navs
            .push(NavPoint::new(FundId::new(fund_id), date, nav_per_unit));
        self
    }

    /// Adds a fund with its fee rate in percent and valuation basis
    pub fn with_fund(mut self, fund_id: i32, management_fee_rate: f64, valuation_basis: i32) -> Self {
        self.funds.insert(
            FundId::new(fund_id),
            FundParams::new(management_fee_rate, valuation_basis),
        );
        self
    }

    /// Adds an agent assignment effective from `effective_date`
    pub fn with_agent(mut self, investor_id: &str, agent_id: i32, effective_date: NaiveDate) -> Self {
        self.agents.push(AgentAssignment {
            investor_id: InvestorId::new(investor_id),
            agent_id: AgentId::new(agent_id),
            effective_date,
        });
        self
    }

    /// Adds a holding snapshot; ids are assigned in insertion order
    pub fn with_holding(
        mut self,
        investor_id: &str,
        fund_id: i32,
        units_after: f64,
        transaction_date: NaiveDate,
    ) -> Self {
        let holding_id = self.holdings.len() as i64 + 1;
        self.holdings.push(HoldingEvent {
            holding_id,
            investor_id: InvestorId::new(investor_id),
            fund_id: FundId::new(fund_id),
            units_after,
            transaction_date,
        });
        self
    }

    /// Replaces the injected faults
    pub fn set_faults(&self, faults: Faults) {
        *self.faults() = faults;
    }

    pub fn clear_faults(&self) {
        self.set_faults(Faults::default());
    }

    /// Writes an investor row directly, bypassing the pipeline
    pub fn seed_investor_row(&self, row: InvestorAumRow) {
        let key = (row.investor_id.clone(), row.fund_id, row.date);
        self.written().investor_rows.entry(key).or_insert(row);
    }

    /// Writes an aggregate directly, bypassing the pipeline
    pub fn seed_aggregate(&self, aggregate: DailyAumAggregate) {
        self.written().daily.insert(aggregate.date, aggregate);
    }

    /// Every stored investor row, ordered by (investor, fund, date)
    pub fn investor_rows(&self) -> Vec<InvestorAumRow> {
        self.written().investor_rows.values().cloned().collect()
    }

    /// Stored investor rows for one date
    pub fn rows_for(&self, date: NaiveDate) -> Vec<InvestorAumRow> {
        self.written()
            .investor_rows
            .values()
            .filter(|row| row.date == date)
            .cloned()
            .collect()
    }

    pub fn aggregate(&self, date: NaiveDate) -> Option<DailyAumAggregate> {
        self.written().daily.get(&date).copied()
    }

    /// Every stored aggregate, ordered by date
    pub fn aggregates(&self) -> Vec<DailyAumAggregate> {
        self.written().daily.values().copied().collect()
    }

    /// Number of chunk inserts received
    pub fn insert_calls(&self) -> usize {
        self.written().insert_calls
    }

    fn written(&self) -> MutexGuard<'_, Written> {
        self.written.lock().expect("written rows lock poisoned")
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().expect("faults lock poisoned")
    }
}

impl DomainPort for InMemoryAumStore {}

#[async_trait]
impl ReferencePort for InMemoryAumStore {
    async fn nav_dates(&self) -> Result<Vec<NaiveDate>, PortError> {
        let dates: BTreeSet<NaiveDate> = self.navs.iter().map(|nav| nav.date).collect();
        Ok(dates.into_iter().collect())
    }

    async fn completed_dates(&self) -> Result<BTreeSet<NaiveDate>, PortError> {
        Ok(self.written().daily.keys().copied().collect())
    }

    async fn funds(&self) -> Result<HashMap<FundId, FundParams>, PortError> {
        if self.faults().fail_funds {
            return Err(PortError::connection("injected fund load failure"));
        }
        Ok(self.funds.clone())
    }

    async fn agent_assignments(&self) -> Result<AgentAssignments, PortError> {
        Ok(AgentAssignments::from_history(self.agents.iter().cloned()))
    }

    async fn day_gaps(&self) -> Result<DayGapTable, PortError> {
        Ok(DayGapTable::from_nav_dates(
            self.navs.iter().map(|nav| (nav.fund_id, nav.date)),
        ))
    }
}

#[async_trait]
impl DailyInputPort for InMemoryAumStore {
    async fn navs_for_date(&self, date: NaiveDate) -> Result<NavsForDate, PortError> {
        if self.faults().fail_navs.contains(&date) {
            return Err(PortError::query("load_navs", format!("injected failure on {date}")));
        }
        Ok(self
            .navs
            .iter()
            .filter(|nav| nav.date == date)
            .map(|nav| (nav.fund_id, nav.nav_per_unit))
            .collect())
    }

    async fn effective_holdings(&self, date: NaiveDate) -> Result<Vec<EffectiveHolding>, PortError> {
        let delay = self.faults().holding_delays.get(&date).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(select_effective_holdings(&self.holdings, date))
    }
}

#[async_trait]
impl AumWritePort for InMemoryAumStore {
    async fn insert_investor_rows(&self, rows: &[InvestorAumRow]) -> Result<u64, BatchWriteError> {
        let faults = self.faults().fail_rows.clone();
        let mut written = self.written();
        written.insert_calls += 1;

        let mut inserted = 0;
        for (index, row) in rows.iter().enumerate() {
            if faults.contains(&(row.date, row.investor_id.clone())) {
                return Err(BatchWriteError::new(
                    index,
                    inserted,
                    PortError::query(
                        "insert_aum_investor_daily",
                        format!("injected failure for {} on {}", row.investor_id, row.date),
                    ),
                ));
            }

            let key = (row.investor_id.clone(), row.fund_id, row.date);
            if !written.investor_rows.contains_key(&key) {
                written.investor_rows.insert(key, row.clone());
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    async fn upsert_daily_aggregate(&self, aggregate: &DailyAumAggregate) -> Result<(), PortError> {
        if self.faults().fail_aggregates.contains(&aggregate.date) {
            return Err(PortError::query(
                "upsert_aum_daily",
                format!("injected failure on {}", aggregate.date),
            ));
        }

        let mut written = self.written();
        match written.daily.get_mut(&aggregate.date) {
            Some(existing) => {
                existing.aum_value = aggregate.aum_value;
                existing.management_fee = aggregate.management_fee;
                existing.updated_at = aggregate.updated_at;
            }
            None => {
                written.daily.insert(aggregate.date, *aggregate);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationPort for InMemoryAumStore {
    async fn count_investor_rows(&self) -> Result<i64, PortError> {
        Ok(self.written().investor_rows.len() as i64)
    }

    async fn count_holdings(&self) -> Result<i64, PortError> {
        Ok(self.holdings.len() as i64)
    }

    async fn investor_row_dates(&self) -> Result<BTreeSet<NaiveDate>, PortError> {
        Ok(self
            .written()
            .investor_rows
            .values()
            .map(|row| row.date)
            .collect())
    }
}
