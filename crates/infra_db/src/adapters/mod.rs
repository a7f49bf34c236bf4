//! Domain Adapters
//!
//! This module provides adapter implementations for domain ports,
//! connecting domain interfaces to the PostgreSQL database layer.
//!
//! # Architecture
//!
//! Each adapter:
//! - Implements the domain's port traits
//! - Translates between domain models and database row types
//! - Uses the repository layer for database operations

pub mod aum;

pub use aum::PostgresAumAdapter;
