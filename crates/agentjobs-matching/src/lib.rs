//! AgentJobs Matching - decides which agent fits which job
//!
//! - Candidate: the capability-set abstraction the scorer is generic over
//! - Scorer: hard disqualifiers plus capped, additive soft components
//! - Ranking: agents for a job, jobs for an agent (with competition penalty)
//!
//! Scoring is pure: no locks, no I/O. Callers hold whatever snapshot of the
//! agent and job they want ranked.

pub mod candidate;
pub mod estimate;
pub mod scorer;
pub mod ranking;

pub use candidate::*;
pub use estimate::*;
pub use scorer::*;
pub use ranking::*;
