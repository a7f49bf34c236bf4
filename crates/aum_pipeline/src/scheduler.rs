//! Date scheduler
//!
//! A fixed pool of workers pulls dates from a bounded channel. Each worker
//! runs its date to completion before taking the next one, so at most
//! `workers` dates are in flight. A failed date is logged and counted and
//! never stops the others.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use domain_aum::{AumError, AumStore, ReferenceData};

use crate::worker::{DateOutcome, DateProcessor};

/// Counters shared by the workers of one run
#[derive(Debug, Default)]
pub struct RunCounters {
    dates_completed: AtomicU64,
    dates_failed: AtomicU64,
    rows_computed: AtomicU64,
    rows_inserted: AtomicU64,
}

impl RunCounters {
    fn record_success(&self, outcome: &DateOutcome) {
        self.dates_completed.fetch_add(1, Ordering::Relaxed);
        self.rows_computed
            .fetch_add(outcome.rows_computed as u64, Ordering::Relaxed);
        self.rows_inserted
            .fetch_add(outcome.rows_inserted, Ordering::Relaxed);
    }

    fn record_failure(&self, error: &AumError) {
        self.dates_failed.fetch_add(1, Ordering::Relaxed);
        self.rows_inserted
            .fetch_add(error.rows_inserted(), Ordering::Relaxed);
    }

    /// Reads the counters; call after every worker has finished
    pub fn snapshot(&self) -> SchedulerReport {
        SchedulerReport {
            dates_completed: self.dates_completed.load(Ordering::Relaxed),
            dates_failed: self.dates_failed.load(Ordering::Relaxed),
            rows_computed: self.rows_computed.load(Ordering::Relaxed),
            rows_inserted: self.rows_inserted.load(Ordering::Relaxed),
            interrupted: false,
        }
    }
}

/// What the scheduler did with its dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerReport {
    pub dates_completed: u64,
    pub dates_failed: u64,
    pub rows_computed: u64,
    pub rows_inserted: u64,
    /// Dispatch stopped early on a shutdown signal
    pub interrupted: bool,
}

/// Bounded worker pool over dates
#[derive(Debug, Clone)]
pub struct DateScheduler {
    workers: usize,
    processor: DateProcessor,
}

impl DateScheduler {
    /// Creates a scheduler with `workers` concurrent dates (at least one)
    pub fn new(workers: usize, processor: DateProcessor) -> Self {
        Self {
            workers: workers.max(1),
            processor,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Processes `dates` and waits for every dispatched date to finish
    ///
    /// When `shutdown` resolves no further dates are handed out. Dates
    /// already taken by a worker run to completion.
    pub async fn run<S, F>(
        &self,
        store: Arc<S>,
        reference: Arc<ReferenceData>,
        dates: Vec<NaiveDate>,
        shutdown: F,
    ) -> SchedulerReport
    where
        S: AumStore,
        F: Future<Output = ()>,
    {
        let (tx, rx) = mpsc::channel::<NaiveDate>(self.workers);
        let rx = Arc::new(Mutex::new(rx));
        let counters = Arc::new(RunCounters::default());

        let mut workers = JoinSet::new();
        for worker_id in 0..self.workers {
            let rx = Arc::clone(&rx);
            let store = Arc::clone(&store);
            let reference = Arc::clone(&reference);
            let counters = Arc::clone(&counters);
            let processor = self.processor.clone();

            workers.spawn(async move {
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some(date) = next else { break };

                    match processor.process(store.as_ref(), &reference, date).await {
                        Ok(outcome) => counters.record_success(&outcome),
                        Err(e) => {
                            counters.record_failure(&e);
                            error!(worker_id, %date, error = %e, "Date failed");
                        }
                    }
                }
            });
        }

        let mut interrupted = false;
        tokio::pin!(shutdown);
        for date in dates {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Shutdown requested, no further dates will be dispatched");
                    interrupted = true;
                    break;
                }
                sent = tx.send(date) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Worker task ended abnormally");
            }
        }

        let mut report = counters.snapshot();
        report.interrupted = interrupted;
        info!(
            completed = report.dates_completed,
            failed = report.dates_failed,
            rows = report.rows_computed,
            inserted = report.rows_inserted,
            "Scheduler finished"
        );
        report
    }
}
