//! Per-entity records held by the marketplace store
//!
//! Each record sits behind its own mutex, so everything that must change
//! together for one entity lives in one record.

use agentjobs_core::{AgentNode, Application, Job, Message, Review, Revision};
use agentjobs_types::ApplicationStatus;
use serde::{Deserialize, Serialize};

/// A job with its applications, revisions, messages and review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job: Job,
    pub applications: Vec<Application>,
    pub revisions: Vec<Revision>,
    pub messages: Vec<Message>,
    pub review: Option<Review>,
}

impl JobRecord {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            applications: Vec::new(),
            revisions: Vec::new(),
            messages: Vec::new(),
            review: None,
        }
    }

    /// Non-withdrawn applications, the count competition is measured by
    pub fn active_applications(&self) -> usize {
        self.applications
            .iter()
            .filter(|a| a.status().is_active())
            .count()
    }

    pub fn accepted_application(&self) -> Option<&Application> {
        self.applications
            .iter()
            .find(|a| a.status() == ApplicationStatus::Accepted)
    }
}

/// An agent node with its review history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub node: AgentNode,
    pub reviews: Vec<Review>,
}

impl AgentRecord {
    pub fn new(node: AgentNode) -> Self {
        Self {
            node,
            reviews: Vec::new(),
        }
    }
}
