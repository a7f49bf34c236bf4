//! Batch writer
//!
//! Splits the rows of a date into fixed-size chunks, inserts them in order
//! and finishes the date by upserting its aggregate. A date whose aggregate
//! was never written is picked up again by the next run; rows that made it
//! in before a failure are ignored on conflict then.

use chrono::NaiveDate;
use tracing::debug;

use domain_aum::{AumError, AumTotals, AumWritePort, DailyAumAggregate, InvestorAumRow};

/// Chunked writer for investor rows
#[derive(Debug, Clone, Copy)]
pub struct BatchWriter {
    batch_size: usize,
}

impl BatchWriter {
    /// Creates a writer; a zero batch size is treated as one
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Inserts `rows` chunk by chunk and returns the rows actually inserted
    ///
    /// Stops at the first failing chunk; later chunks are not attempted. The
    /// error counts the rows committed by earlier chunks and by the failing
    /// chunk before its bad row.
    pub async fn write_rows<S>(
        &self,
        store: &S,
        date: NaiveDate,
        rows: &[InvestorAumRow],
    ) -> Result<u64, AumError>
    where
        S: AumWritePort + ?Sized,
    {
        let mut inserted = 0;
        for (chunk, batch) in rows.chunks(self.batch_size).enumerate() {
            let written = store.insert_investor_rows(batch).await.map_err(|e| {
                AumError::BatchInsert {
                    date,
                    chunk,
                    index: e.index,
                    row: chunk * self.batch_size + e.index,
                    inserted: inserted + e.inserted,
                    source: e.source,
                }
            })?;

            debug!(%date, chunk, rows = batch.len(), inserted = written, "Chunk written");
            inserted += written;
        }

        Ok(inserted)
    }

    /// Marks `date` complete with its totals
    pub async fn commit_date<S>(
        &self,
        store: &S,
        date: NaiveDate,
        totals: AumTotals,
    ) -> Result<(), AumError>
    where
        S: AumWritePort + ?Sized,
    {
        let aggregate = DailyAumAggregate::new(date, totals);
        store
            .upsert_daily_aggregate(&aggregate)
            .await
            .map_err(|source| AumError::Aggregate { date, source })
    }
}

impl Default for BatchWriter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BATCH_SIZE)
    }
}
