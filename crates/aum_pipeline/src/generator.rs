//! AUM generator
//!
//! One run: plan the dates, load reference data, dispatch the pending dates
//! to the scheduler, then verify coverage.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use domain_aum::{AumStore, VerificationReport};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::reference::{load_date_plan, load_reference_data};
use crate::scheduler::DateScheduler;
use crate::verifier;
use crate::worker::DateProcessor;
use crate::writer::BatchWriter;

/// Outcome of a generation run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Distinct NAV dates
    pub nav_dates: usize,
    /// NAV dates completed by an earlier run
    pub dates_skipped: usize,
    /// Dates handed to the scheduler
    pub dates_planned: usize,
    pub dates_completed: u64,
    pub dates_failed: u64,
    pub rows_computed: u64,
    /// Rows actually inserted; re-runs over partly written dates insert fewer
    pub rows_inserted: u64,
    pub interrupted: bool,
    pub elapsed: Duration,
    pub verification: VerificationReport,
}

impl RunSummary {
    /// Rows inserted per second of wall time
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.rows_inserted as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives generation and verification over an [`AumStore`]
pub struct Generator<S> {
    store: Arc<S>,
    scheduler: DateScheduler,
}

impl<S: AumStore> Generator<S> {
    pub fn new(store: Arc<S>, config: &PipelineConfig) -> Self {
        let processor = DateProcessor::new(BatchWriter::new(config.batch_size), config.date_timeout());
        Self {
            store,
            scheduler: DateScheduler::new(config.workers, processor),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Generates every pending date, then verifies
    pub async fn generate(&self) -> Result<RunSummary, PipelineError> {
        self.generate_until(std::future::pending()).await
    }

    /// Like [`Generator::generate`], dispatching no new dates once `shutdown` resolves
    pub async fn generate_until<F>(&self, shutdown: F) -> Result<RunSummary, PipelineError>
    where
        F: Future<Output = ()>,
    {
        let run_id = Uuid::now_v7();
        self.run(run_id, shutdown)
            .instrument(info_span!("aum_run", %run_id))
            .await
    }

    async fn run<F>(&self, run_id: Uuid, shutdown: F) -> Result<RunSummary, PipelineError>
    where
        F: Future<Output = ()>,
    {
        let start = Instant::now();
        info!(workers = self.scheduler.workers(), "Generating AUM");

        let plan = load_date_plan(self.store.as_ref()).await?;
        if plan.skipped > 0 {
            info!(skipped = plan.skipped, "Skipping dates already in aum_daily");
        }

        let mut summary = RunSummary {
            run_id,
            nav_dates: plan.total,
            dates_skipped: plan.skipped,
            dates_planned: plan.pending.len(),
            dates_completed: 0,
            dates_failed: 0,
            rows_computed: 0,
            rows_inserted: 0,
            interrupted: false,
            elapsed: Duration::ZERO,
            verification: VerificationReport::default(),
        };

        if plan.is_empty() {
            info!("No new dates to process");
        } else {
            info!(dates = plan.pending.len(), "Processing dates");
            let reference = Arc::new(load_reference_data(self.store.as_ref()).await?);

            let report = self
                .scheduler
                .run(Arc::clone(&self.store), reference, plan.pending, shutdown)
                .await;

            summary.dates_completed = report.dates_completed;
            summary.dates_failed = report.dates_failed;
            summary.rows_computed = report.rows_computed;
            summary.rows_inserted = report.rows_inserted;
            summary.interrupted = report.interrupted;
        }

        summary.elapsed = start.elapsed();
        info!(
            records = summary.rows_inserted,
            failed_dates = summary.dates_failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            rate = summary.throughput(),
            "Completed generating AUM"
        );

        summary.verification = self.verify().await?;
        Ok(summary)
    }

    /// Coverage check only; never writes
    pub async fn verify(&self) -> Result<VerificationReport, PipelineError> {
        verifier::verify(self.store.as_ref()).await
    }
}
