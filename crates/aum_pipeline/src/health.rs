//! Startup health check

use tracing::info;

use core_kernel::{HealthCheckResult, HealthCheckable};

use crate::error::PipelineError;

/// Runs the adapter's health check and fails when it reports unhealthy
pub async fn ensure_healthy<A>(adapter: &A) -> Result<HealthCheckResult, PipelineError>
where
    A: HealthCheckable + ?Sized,
{
    let result = adapter.health_check().await;
    if !result.is_healthy() {
        return Err(PipelineError::Unhealthy {
            adapter_id: result.adapter_id,
            message: result
                .message
                .unwrap_or_else(|| format!("{:?}", result.status)),
        });
    }

    info!(
        adapter = %result.adapter_id,
        latency_ms = result.latency_ms,
        "Store health check passed"
    );
    Ok(result)
}
