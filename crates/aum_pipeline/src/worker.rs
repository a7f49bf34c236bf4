//! Per-date processing

use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, info_span, warn, Instrument};

use domain_aum::{compute_date, AumError, AumStore, AumTotals, ReferenceData};

use crate::writer::BatchWriter;

/// Result of a completed date
#[derive(Debug, Clone, PartialEq)]
pub struct DateOutcome {
    pub date: NaiveDate,
    pub rows_computed: usize,
    pub rows_inserted: u64,
    pub totals: AumTotals,
}

/// Runs one date end to end: load, compute, write, commit
#[derive(Debug, Clone)]
pub struct DateProcessor {
    writer: BatchWriter,
    timeout: Duration,
}

impl DateProcessor {
    pub fn new(writer: BatchWriter, timeout: Duration) -> Self {
        Self { writer, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Processes `date` under the per-date timeout
    ///
    /// Work cut short by the timeout leaves the date without an aggregate,
    /// so it is retried on the next run.
    pub async fn process<S>(
        &self,
        store: &S,
        reference: &ReferenceData,
        date: NaiveDate,
    ) -> Result<DateOutcome, AumError>
    where
        S: AumStore + ?Sized,
    {
        let work = self
            .run(store, reference, date)
            .instrument(info_span!("date", %date));

        match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(AumError::Timeout {
                date,
                timeout: self.timeout,
            }),
        }
    }

    async fn run<S>(
        &self,
        store: &S,
        reference: &ReferenceData,
        date: NaiveDate,
    ) -> Result<DateOutcome, AumError>
    where
        S: AumStore + ?Sized,
    {
        let navs = store
            .navs_for_date(date)
            .await
            .map_err(|source| AumError::Load {
                what: "NAVs",
                date,
                source,
            })?;

        // Without NAVs no row can be priced; the date still gets its aggregate.
        let holdings = if navs.is_empty() {
            warn!("No NAV data found for date");
            Vec::new()
        } else {
            store
                .effective_holdings(date)
                .await
                .map_err(|source| AumError::Load {
                    what: "holdings",
                    date,
                    source,
                })?
        };

        if !navs.is_empty() && holdings.is_empty() {
            warn!("No holdings found for date");
        }

        let computation = compute_date(date, &holdings, &navs, reference);
        if computation.skipped_no_agent > 0 {
            debug!(
                skipped = computation.skipped_no_agent,
                "Holdings without a current agent skipped"
            );
        }

        let rows_inserted = self.writer.write_rows(store, date, &computation.rows).await?;
        self.writer
            .commit_date(store, date, computation.totals)
            .await?;

        info!(
            rows = computation.rows.len(),
            inserted = rows_inserted,
            aum = computation.totals.aum_value,
            fee = computation.totals.management_fee,
            "Date completed"
        );

        Ok(DateOutcome {
            date,
            rows_computed: computation.rows.len(),
            rows_inserted,
            totals: computation.totals,
        })
    }
}
