//! Pipeline error handling
//!
//! Run-level failures. Per-date failures are `domain_aum::AumError`; they are
//! logged and counted by the scheduler and never end a run.

use thiserror::Error;

use core_kernel::PortError;
use infra_db::DatabaseError;

/// Errors that stop a run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Failed to load {what}: {source}")]
    ReferenceLoad {
        what: &'static str,
        #[source]
        source: PortError,
    },

    #[error("Verification failed: {0}")]
    Verification(#[source] PortError),

    #[error("Store {adapter_id} is unhealthy: {message}")]
    Unhealthy { adapter_id: String, message: String },

    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl PipelineError {
    /// Creates a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::Config(message.into())
    }

    /// Wraps a failed reference load
    pub fn reference_load(what: &'static str) -> impl FnOnce(PortError) -> Self {
        move |source| PipelineError::ReferenceLoad { what, source }
    }

    /// Returns true for failures of the configuration itself
    pub fn is_config(&self) -> bool {
        matches!(self, PipelineError::Config(_) | PipelineError::ConfigSource(_))
    }
}
