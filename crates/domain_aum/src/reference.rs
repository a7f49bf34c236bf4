//! Reference data shared by every date of a run
//!
//! Everything here is loaded once before dispatch and is read-only
//! afterwards. Workers receive it behind an `Arc` and only see lookups.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use core_kernel::{AgentId, FundId, InvestorId};

use crate::agent::AgentAssignments;
use crate::fund::FundParams;
use crate::nav::DayGapTable;

/// Fund parameters, current agents and day gaps for a run
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    funds: HashMap<FundId, FundParams>,
    agents: AgentAssignments,
    day_gaps: DayGapTable,
}

impl ReferenceData {
    /// Freezes the loaded maps
    pub fn new(
        funds: HashMap<FundId, FundParams>,
        agents: AgentAssignments,
        day_gaps: DayGapTable,
    ) -> Self {
        Self {
            funds,
            agents,
            day_gaps,
        }
    }

    /// Fee parameters of a fund; a fund missing from the table accrues no fee
    pub fn fund_params(&self, fund_id: FundId) -> FundParams {
        self.funds.get(&fund_id).copied().unwrap_or_default()
    }

    /// Current agent of an investor
    pub fn agent_for(&self, investor_id: &InvestorId) -> Option<AgentId> {
        self.agents.agent_for(investor_id)
    }

    /// Accrual days for a fund's NAV on a date
    pub fn days(&self, fund_id: FundId, date: NaiveDate) -> i32 {
        self.day_gaps.days(fund_id, date)
    }

    pub fn fund_count(&self) -> usize {
        self.funds.len()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn day_gap_count(&self) -> usize {
        self.day_gaps.len()
    }
}

/// The dates a run has to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePlan {
    /// NAV dates still missing a daily aggregate, ascending
    pub pending: Vec<NaiveDate>,
    /// Number of NAV dates already completed by an earlier run
    pub skipped: usize,
    /// Number of distinct NAV dates
    pub total: usize,
}

impl DatePlan {
    /// Keeps the NAV dates that have no daily aggregate yet
    pub fn new(nav_dates: &[NaiveDate], completed: &BTreeSet<NaiveDate>) -> Self {
        let pending: Vec<NaiveDate> = nav_dates
            .iter()
            .filter(|date| !completed.contains(date))
            .copied()
            .collect();

        Self {
            skipped: nav_dates.len() - pending.len(),
            total: nav_dates.len(),
            pending,
        }
    }

    /// Returns true when every NAV date is already completed
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
