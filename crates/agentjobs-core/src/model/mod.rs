//! Marketplace records

pub mod agent;
pub mod application;
pub mod company;
pub mod job;
pub mod message;
pub mod review;
pub mod revision;
pub mod transaction;

pub use agent::AgentNode;
pub use application::Application;
pub use company::Company;
pub use job::Job;
pub use message::Message;
pub use review::{Review, ReviewScores};
pub use revision::Revision;
pub use transaction::PaymentTransaction;
