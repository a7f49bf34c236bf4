//! Coverage verification

use tracing::{info, warn};

use domain_aum::{ReferencePort, VerificationPort, VerificationReport};

use crate::error::PipelineError;

/// Compares NAV dates with the dates that have investor rows
///
/// Read-only. Dates present in `aum_investor_daily` but without a NAV are
/// not reported.
pub async fn verify<S>(store: &S) -> Result<VerificationReport, PipelineError>
where
    S: ReferencePort + VerificationPort + ?Sized,
{
    info!("Verifying AUM data");

    let nav_dates = store.nav_dates().await.map_err(PipelineError::Verification)?;
    let rows = store
        .count_investor_rows()
        .await
        .map_err(PipelineError::Verification)?;
    let holdings = store
        .count_holdings()
        .await
        .map_err(PipelineError::Verification)?;
    let covered = store
        .investor_row_dates()
        .await
        .map_err(PipelineError::Verification)?;

    let report = VerificationReport::build(&nav_dates, &covered, rows, holdings);

    info!(
        nav_dates = report.nav_date_count,
        aum_records = report.investor_row_count,
        holdings = report.holding_count,
        "Verification counts"
    );

    if report.is_complete() {
        info!("SUCCESS: all NAV dates have AUM records");
    } else {
        let sample: Vec<String> = report
            .missing_sample()
            .iter()
            .map(|date| date.to_string())
            .collect();
        warn!(
            missing = report.missing_dates.len(),
            sample = %sample.join(", "),
            more = report.missing_remainder(),
            "WARNING: NAV dates without AUM records"
        );
    }

    Ok(report)
}
