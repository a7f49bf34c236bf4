//! AUM domain errors

use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

use core_kernel::PortError;

/// A chunk insert that failed part-way
///
/// `index` is the position of the failing row inside the chunk and
/// `inserted` the number of rows before it that were committed.
#[derive(Debug, Error)]
#[error("Insert failed at row {index} after {inserted} inserted: {source}")]
pub struct BatchWriteError {
    pub index: usize,
    pub inserted: u64,
    #[source]
    pub source: PortError,
}

impl BatchWriteError {
    pub fn new(index: usize, inserted: u64, source: PortError) -> Self {
        Self {
            index,
            inserted,
            source,
        }
    }
}

/// Failures that abort a single date; the run continues with the next one
#[derive(Debug, Error)]
pub enum AumError {
    #[error("Failed to load {what} for {date}: {source}")]
    Load {
        what: &'static str,
        date: NaiveDate,
        #[source]
        source: PortError,
    },

    #[error("Batch insert for {date} failed at row {row} (chunk {chunk}, index {index}): {source}")]
    BatchInsert {
        date: NaiveDate,
        chunk: usize,
        index: usize,
        /// Position of the failing row among all rows of the date
        row: usize,
        /// Rows of the date committed before the failure
        inserted: u64,
        #[source]
        source: PortError,
    },

    #[error("Failed to upsert daily aggregate for {date}: {source}")]
    Aggregate {
        date: NaiveDate,
        #[source]
        source: PortError,
    },

    #[error("Processing {date} timed out after {timeout:?}")]
    Timeout {
        date: NaiveDate,
        timeout: Duration,
    },
}

impl AumError {
    /// The date the failure belongs to
    pub fn date(&self) -> NaiveDate {
        match self {
            AumError::Load { date, .. }
            | AumError::BatchInsert { date, .. }
            | AumError::Aggregate { date, .. }
            | AumError::Timeout { date, .. } => *date,
        }
    }

    /// Rows known to be committed before the date failed
    pub fn rows_inserted(&self) -> u64 {
        match self {
            AumError::BatchInsert { inserted, .. } => *inserted,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn test_sub_second_timeout_is_readable() {
        let err = AumError::Timeout {
            date: day(),
            timeout: Duration::from_millis(50),
        };
        assert_eq!(err.to_string(), "Processing 2024-01-02 timed out after 50ms");
        assert_eq!(err.rows_inserted(), 0);
    }

    #[test]
    fn test_batch_insert_carries_committed_rows() {
        let err = AumError::BatchInsert {
            date: day(),
            chunk: 1,
            index: 3,
            row: 13,
            inserted: 13,
            source: PortError::query("insert_aum_investor_daily", "check violation"),
        };
        assert_eq!(err.rows_inserted(), 13);
        assert_eq!(err.date(), day());
    }
}
