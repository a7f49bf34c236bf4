//! Test Utilities for the AUM pipeline
//!
//! This crate provides shared test utilities:
//!
//! - **Memory**: an in-memory store implementing every AUM port, with fault injection
//! - **Fixtures**: upstream data sets usable in memory and in PostgreSQL
//! - **Database**: testcontainers-backed PostgreSQL with the full schema
//! - **Assertions**: float and aggregate checks

pub mod assertions;
pub mod database;
pub mod fixtures;
pub mod memory;

pub use assertions::*;
pub use fixtures::*;
pub use memory::{Faults, InMemoryAumStore};
