//! Net Asset Value (NAV) points and the per-fund day-gap table
//!
//! Fees accrue every calendar day while NAVs are only published on business
//! days. Each NAV carries the number of days since the fund's previous NAV so
//! that summing `days` over a fund's NAV series covers every calendar day
//! exactly once.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::FundId;

/// Smallest accrual period a NAV can carry
pub const MIN_DAYS: i32 = 1;

/// A single published NAV
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavPoint {
    /// Fund ID
    pub fund_id: FundId,
    /// Publication date
    pub date: NaiveDate,
    /// NAV value per unit
    pub nav_per_unit: f64,
}

impl NavPoint {
    /// Creates a NAV point
    pub fn new(fund_id: FundId, date: NaiveDate, nav_per_unit: f64) -> Self {
        Self {
            fund_id,
            date,
            nav_per_unit,
        }
    }
}

/// NAVs published on a single date, keyed by fund
pub type NavsForDate = HashMap<FundId, f64>;

/// Mapping (fund, NAV date) to the accrual days attributed to that NAV
#[derive(Debug, Clone, Default)]
pub struct DayGapTable {
    days: HashMap<(FundId, NaiveDate), i32>,
}

impl DayGapTable {
    /// Builds the table from precomputed gaps, clamping non-positive values
    ///
    /// A key listed more than once keeps its largest gap.
    pub fn from_gaps(gaps: impl IntoIterator<Item = (FundId, NaiveDate, i32)>) -> Self {
        let mut days: HashMap<(FundId, NaiveDate), i32> = HashMap::new();
        for (fund_id, date, gap) in gaps {
            let gap = gap.max(MIN_DAYS);
            days.entry((fund_id, date))
                .and_modify(|existing| *existing = (*existing).max(gap))
                .or_insert(gap);
        }
        Self { days }
    }

    /// Derives the gaps from a raw NAV series
    ///
    /// Per fund, the first publication gets one day and every later one the
    /// calendar difference to its predecessor. Repeated (fund, date) pairs are
    /// counted once.
    pub fn from_nav_dates(navs: impl IntoIterator<Item = (FundId, NaiveDate)>) -> Self {
        let mut sorted: Vec<(FundId, NaiveDate)> = navs.into_iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut gaps = Vec::with_capacity(sorted.len());
        let mut previous: Option<(FundId, NaiveDate)> = None;
        for (fund_id, date) in sorted {
            let days = match previous {
                Some((prev_fund, prev_date)) if prev_fund == fund_id => {
                    (date - prev_date).num_days() as i32
                }
                _ => MIN_DAYS,
            };
            gaps.push((fund_id, date, days));
            previous = Some((fund_id, date));
        }

        Self::from_gaps(gaps)
    }

    /// Accrual days for a fund's NAV on `date`, at least one
    pub fn days(&self, fund_id: FundId, date: NaiveDate) -> i32 {
        self.days
            .get(&(fund_id, date))
            .copied()
            .unwrap_or(MIN_DAYS)
            .max(MIN_DAYS)
    }

    /// Number of (fund, date) entries
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true when no gaps were loaded
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
