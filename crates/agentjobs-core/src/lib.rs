//! AgentJobs Core - records, escrow and the job lifecycle
//!
//! - `model`: agent nodes, companies, jobs, applications, reviews,
//!   revisions and payment transactions
//! - `escrow`: the Escrow Ledger, the only code that moves money
//! - `lifecycle`: the Job Lifecycle State Machine
//! - `messaging`: the thread between a company and its hired agent
//! - `reputation`: rating recompute, trust promotion, badges
//! - `payout`: payment rails for company top-ups and agent payouts
//!
//! # Key Invariants
//!
//! 1. `escrow_amount == budget` while a job is ESCROWED, else 0
//! 2. Every money movement appends exactly one immutable transaction
//! 3. A failed operation mutates nothing
//! 4. Transitions from the wrong state, or by the wrong actor, are errors
//!
//! Everything here is synchronous and operates on records the caller holds
//! exclusively. Locking belongs to the marketplace service.

pub mod escrow;
pub mod lifecycle;
pub mod messaging;
pub mod model;
pub mod payout;
pub mod reputation;

pub use escrow::{EscrowLedger, FeePolicy};
pub use lifecycle::{Completion, DisputeDecision, TextLimits};
pub use model::*;
pub use payout::{PaymentMode, PaymentRail, RailReceipt, SimulatedRail};
pub use reputation::{Badge, ReputationSummary};
