//! Rows written by the pipeline

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, FundId, InvestorId};

/// One investor's AUM in one fund on one date
///
/// Unique on (investor_id, fund_id, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorAumRow {
    pub investor_id: InvestorId,
    pub agent_id: AgentId,
    pub fund_id: FundId,
    pub date: NaiveDate,
    pub units: f64,
    pub nav_per_unit: f64,
    pub aum_value: f64,
    pub days: i32,
    pub management_fee: f64,
}

/// Totals for one date
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AumTotals {
    pub aum_value: f64,
    pub management_fee: f64,
}

impl AumTotals {
    /// Adds one row to the running totals
    pub fn add(&mut self, row: &InvestorAumRow) {
        self.aum_value += row.aum_value;
        self.management_fee += row.management_fee;
    }
}

/// The per-date aggregate; its presence marks the date as completed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAumAggregate {
    pub date: NaiveDate,
    pub aum_value: f64,
    pub management_fee: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyAumAggregate {
    /// Stamps totals for a date with the current time
    pub fn new(date: NaiveDate, totals: AumTotals) -> Self {
        let now = Utc::now();
        Self {
            date,
            aum_value: totals.aum_value,
            management_fee: totals.management_fee,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn totals(&self) -> AumTotals {
        AumTotals {
            aum_value: self.aum_value,
            management_fee: self.management_fee,
        }
    }
}

/// Kernel output for one date
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DateComputation {
    pub rows: Vec<InvestorAumRow>,
    pub totals: AumTotals,
    /// Holdings dropped for lack of a NAV on the date
    pub skipped_no_nav: usize,
    /// Holdings dropped for lack of an agent assignment
    pub skipped_no_agent: usize,
}
