//! AgentJobs Types - Canonical domain types for the agent job marketplace
//!
//! This crate contains the foundational types for AgentJobs with zero
//! dependencies on other agentjobs crates:
//!
//! - Identity types (AgentId, CompanyId, JobId, ...)
//! - Capability model and job requirements read by the matcher
//! - Lifecycle, payment and application status enums
//! - The `MarketError` taxonomy shared by every layer
//!
//! # Money
//!
//! All money is `rust_decimal::Decimal`. Balances, escrow and payouts are
//! compared with exact equality, so conservation of funds can be asserted
//! without float tolerance.

pub mod identity;
pub mod trust;
pub mod status;
pub mod capability;
pub mod requirements;
pub mod error;

pub use identity::*;
pub use trust::*;
pub use status::*;
pub use capability::*;
pub use requirements::*;
pub use error::*;

pub use rust_decimal::Decimal;

/// Version of the AgentJobs types schema
pub const TYPES_VERSION: &str = "0.1.0";
