//! AUM Pipeline
//!
//! This crate runs daily Assets-Under-Management generation against an
//! [`domain_aum::AumStore`]: it plans the dates that still lack a daily
//! aggregate, loads the shared reference data once, processes the dates on
//! a bounded worker pool and verifies coverage at the end.
//!
//! # Architecture
//!
//! - **Reference**: read-once loads and the date plan
//! - **Worker**: load, compute, write and commit a single date
//! - **Writer**: chunked inserts and the aggregate upsert
//! - **Scheduler**: bounded worker pool with shared counters
//! - **Verifier**: NAV-date coverage report
//!
//! # Example
//!
//! ```rust,ignore
//! use aum_pipeline::{Generator, PipelineConfig};
//! use infra_db::PostgresAumAdapter;
//!
//! let config = PipelineConfig::from_env()?;
//! let generator = Generator::new(Arc::new(PostgresAumAdapter::new(pool)), &config);
//! let summary = generator.generate().await?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod health;
pub mod reference;
pub mod scheduler;
pub mod telemetry;
pub mod verifier;
pub mod worker;
pub mod writer;

pub use cli::{Cli, Mode};
pub use config::{LogFormat, PipelineConfig};
pub use error::PipelineError;
pub use generator::{Generator, RunSummary};
pub use health::ensure_healthy;
pub use scheduler::{DateScheduler, SchedulerReport};
pub use worker::{DateOutcome, DateProcessor};
pub use writer::BatchWriter;
