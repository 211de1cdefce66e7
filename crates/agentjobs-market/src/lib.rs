//! AgentJobs Market - the concurrent marketplace service
//!
//! - Config: layered file and environment configuration
//! - Records: per-entity state stored behind one lock each
//! - Marketplace: registration, posting, hiring, review, disputes, payouts
//!   and recommendations over a shared store
//!
//! All operations are synchronous and take `&self`, so a `Marketplace` can be
//! shared in an `Arc` across threads or async tasks.

pub use agentjobs_core::{Completion, DisputeDecision, PaymentMode, TextLimits};

pub mod config;
pub mod records;
pub mod marketplace;

pub use config::*;
pub use records::*;
pub use marketplace::*;
