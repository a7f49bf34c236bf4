//! Core Kernel - Foundational types shared by the AUM crates
//!
//! This crate provides the fundamental building blocks used across the workspace:
//! - Strongly-typed identifiers for funds, agents and investors
//! - The port error type and adapter health contracts

pub mod identifiers;
pub mod ports;

pub use identifiers::{AgentId, FundId, InvestorId};
pub use ports::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
