//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL side of the AUM generator using SQLx:
//! the connection pool, the repositories holding every query the pipeline
//! runs, the adapter implementing the `domain_aum` ports, and the write-side
//! migration.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories own the SQL and
//! return plain row structs; `PostgresAumAdapter` converts those rows into
//! domain types and database errors into port errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresAumAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/urs")).await?;
//! let store = PostgresAumAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod migrations;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, DatabaseConfig, DEFAULT_MAX_CONNECTIONS};
pub use error::DatabaseError;
pub use migrations::run_migrations;
pub use adapters::PostgresAumAdapter;
