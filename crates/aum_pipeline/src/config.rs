//! Pipeline configuration
//!
//! Values come from `URS_*` environment variables (a `.env` file is loaded
//! by the binary first). Only `URS_DATABASE_URL` is required.

use std::time::Duration;

use serde::Deserialize;

use infra_db::{DatabaseConfig, DEFAULT_MAX_CONNECTIONS};

use crate::error::PipelineError;

/// Default number of date workers
pub const DEFAULT_WORKERS: usize = 8;
/// Default investor rows per insert chunk
pub const DEFAULT_BATCH_SIZE: usize = 10_000;
/// Default per-date timeout in seconds
pub const DEFAULT_DATE_TIMEOUT_SECS: u64 = 5 * 60;
/// Statements a worker has in flight at once; workers run their date sequentially
pub const QUERIES_PER_WORKER: u32 = 1;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// AUM pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// PostgreSQL connection string
    #[serde(default)]
    pub database_url: String,
    /// Date workers
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Investor rows per insert chunk
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Connection pool capacity
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Per-date timeout in seconds
    #[serde(default = "default_date_timeout_secs")]
    pub date_timeout_secs: u64,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log format
    #[serde(default)]
    pub log_format: LogFormat,
    /// Apply the write-side migrations before running
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_date_timeout_secs() -> u64 {
    DEFAULT_DATE_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            workers: DEFAULT_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            date_timeout_secs: DEFAULT_DATE_TIMEOUT_SECS,
            log_level: default_log_level(),
            log_format: LogFormat::Text,
            run_migrations: false,
        }
    }
}

impl PipelineConfig {
    /// Loads configuration from `URS_*` environment variables
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_environment(config::Environment::with_prefix("URS"))
    }

    /// Loads configuration from the given environment source
    pub fn from_environment(environment: config::Environment) -> Result<Self, PipelineError> {
        let config: Self = config::Config::builder()
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Per-date timeout
    pub fn date_timeout(&self) -> Duration {
        Duration::from_secs(self.date_timeout_secs)
    }

    /// Pool settings derived from this configuration
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone()).max_connections(self.max_connections)
    }

    /// Checks required values and the pool sizing rule
    ///
    /// Every worker must be able to hold a connection at the same time:
    /// `workers * QUERIES_PER_WORKER <= max_connections`.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.database_url.trim().is_empty() {
            return Err(PipelineError::config("URS_DATABASE_URL is required"));
        }
        if self.workers == 0 {
            return Err(PipelineError::config("workers must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::config("batch_size must be at least 1"));
        }
        if self.date_timeout_secs == 0 {
            return Err(PipelineError::config("date_timeout_secs must be positive"));
        }

        let needed = u32::try_from(self.workers)
            .ok()
            .and_then(|w| w.checked_mul(QUERIES_PER_WORKER));
        match needed {
            Some(needed) if needed <= self.max_connections => Ok(()),
            _ => Err(PipelineError::config(format!(
                "{} workers need {} connections but the pool holds {}",
                self.workers,
                self.workers.saturating_mul(QUERIES_PER_WORKER as usize),
                self.max_connections
            ))),
        }
    }
}
