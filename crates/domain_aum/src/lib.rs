//! AUM Domain
//!
//! This crate implements the domain side of the daily Assets-Under-Management
//! generator: the reference data shared by a run, effective-holding
//! selection, the AUM and management-fee kernel, the coverage report, and the
//! ports through which the pipeline reaches its store.
//!
//! # Key Concepts
//!
//! - **NAV**: Net Asset Value per unit, published on business days only
//! - **Day gap**: calendar days since a fund's previous NAV; a NAV accrues
//!   fees for its whole gap
//! - **Effective holding**: an investor's latest positive units snapshot in a
//!   fund as of a date
//! - **Completed date**: a date with a daily aggregate; later runs skip it
//!
//! # Fee Formula
//!
//! ```text
//! aum            = units * nav_per_unit
//! management_fee = (aum * rate% / 100 / basis) * days
//! ```
//!
//! with `basis` 365 when the fund leaves it at zero and `days` at least one.

pub mod agent;
pub mod error;
pub mod fund;
pub mod holding;
pub mod kernel;
pub mod nav;
pub mod ports;
pub mod record;
pub mod reference;
pub mod verification;

pub use agent::{AgentAssignment, AgentAssignments};
pub use error::{AumError, BatchWriteError};
pub use fund::{FundParams, DEFAULT_VALUATION_BASIS};
pub use holding::{select_effective_holdings, EffectiveHolding, HoldingEvent};
pub use kernel::{aum_value, compute_date, management_fee};
pub use nav::{DayGapTable, NavPoint, NavsForDate};
pub use ports::{AumStore, AumWritePort, DailyInputPort, ReferencePort, VerificationPort};
pub use record::{AumTotals, DailyAumAggregate, DateComputation, InvestorAumRow};
pub use reference::{DatePlan, ReferenceData};
pub use verification::{VerificationReport, MISSING_SAMPLE_SIZE};
