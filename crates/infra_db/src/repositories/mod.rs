//! Repository implementations for the AUM tables
//!
//! This module provides concrete repositories that hold the SQL of the AUM
//! generator and map between database rows and plain row structs. The
//! adapter layer turns those rows into domain types.
//!
//! # Architecture
//!
//! Each repository follows these principles:
//! - Runtime-checked queries (`sqlx::query_as` with `FromRow`)
//! - Window functions stay in SQL so only the needed rows leave the server
//! - No cross-connection transactions; every statement stands alone

pub mod reference;
pub mod daily_input;
pub mod aum_writer;
pub mod verification;

pub use reference::ReferenceRepository;
pub use daily_input::DailyInputRepository;
pub use aum_writer::AumWriteRepository;
pub use verification::VerificationRepository;
