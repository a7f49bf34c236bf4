//! Read-once inputs of a run

use tracing::info;

use domain_aum::{DatePlan, ReferenceData, ReferencePort};

use crate::error::PipelineError;

/// Loads NAV dates and completed dates and splits them into a plan
pub async fn load_date_plan<S>(store: &S) -> Result<DatePlan, PipelineError>
where
    S: ReferencePort + ?Sized,
{
    let nav_dates = store
        .nav_dates()
        .await
        .map_err(PipelineError::reference_load("NAV dates"))?;
    info!(count = nav_dates.len(), "Loaded NAV dates");

    let completed = store
        .completed_dates()
        .await
        .map_err(PipelineError::reference_load("completed dates"))?;
    info!(count = completed.len(), "Loaded existing aum_daily dates");

    Ok(DatePlan::new(&nav_dates, &completed))
}

/// Loads fund parameters, current agents and day gaps
///
/// Any failure here aborts the run before a single date is dispatched.
pub async fn load_reference_data<S>(store: &S) -> Result<ReferenceData, PipelineError>
where
    S: ReferencePort + ?Sized,
{
    let funds = store
        .funds()
        .await
        .map_err(PipelineError::reference_load("funds"))?;
    info!(count = funds.len(), "Loaded funds");

    let agents = store
        .agent_assignments()
        .await
        .map_err(PipelineError::reference_load("agent assignments"))?;
    info!(count = agents.len(), "Loaded agent mappings");

    let day_gaps = store
        .day_gaps()
        .await
        .map_err(PipelineError::reference_load("NAV day gaps"))?;
    info!(count = day_gaps.len(), "Loaded NAV day gaps");

    Ok(ReferenceData::new(funds, agents, day_gaps))
}
