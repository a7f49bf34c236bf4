//! Coverage report over NAV dates
//!
//! Coverage is judged by the presence of investor rows, not by the daily
//! aggregate. A date whose holdings were all filtered out is completed for
//! the scheduler yet reported missing here, which is the signal operators
//! use to spot silent data gaps.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How many missing dates a report lists before summarizing
pub const MISSING_SAMPLE_SIZE: usize = 10;

/// Record counts and the NAV dates without investor rows
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerificationReport {
    pub nav_date_count: usize,
    pub investor_row_count: i64,
    pub holding_count: i64,
    /// NAV dates with no investor row, ascending
    pub missing_dates: Vec<NaiveDate>,
}

impl VerificationReport {
    /// Builds the report from the NAV dates and the dates holding investor rows
    pub fn build(
        nav_dates: &[NaiveDate],
        covered: &BTreeSet<NaiveDate>,
        investor_row_count: i64,
        holding_count: i64,
    ) -> Self {
        let missing_dates = nav_dates
            .iter()
            .filter(|date| !covered.contains(date))
            .copied()
            .collect();

        Self {
            nav_date_count: nav_dates.len(),
            investor_row_count,
            holding_count,
            missing_dates,
        }
    }

    /// Returns true when every NAV date has investor rows
    pub fn is_complete(&self) -> bool {
        self.missing_dates.is_empty()
    }

    /// The first missing dates, at most [`MISSING_SAMPLE_SIZE`]
    pub fn missing_sample(&self) -> &[NaiveDate] {
        let end = self.missing_dates.len().min(MISSING_SAMPLE_SIZE);
        &self.missing_dates[..end]
    }

    /// Missing dates beyond the sample
    pub fn missing_remainder(&self) -> usize {
        self.missing_dates.len().saturating_sub(MISSING_SAMPLE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_caps_at_ten() {
        let nav_dates: Vec<NaiveDate> = (1..=15)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        let report = VerificationReport::build(&nav_dates, &BTreeSet::new(), 0, 0);

        assert!(!report.is_complete());
        assert_eq!(report.missing_sample().len(), 10);
        assert_eq!(report.missing_sample()[0], nav_dates[0]);
        assert_eq!(report.missing_remainder(), 5);
    }
}
