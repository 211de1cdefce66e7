//! Applications to jobs

use agentjobs_types::{AgentId, ApplicationId, ApplicationStatus, Decimal, JobId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An agent's bid on a job.
///
/// At most one non-withdrawn application exists per (agent, job) pair, and
/// a hired job has exactly one ACCEPTED application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub agent_id: AgentId,
    pub bid_amount: Decimal,
    pub cover_letter: String,
    /// Match score at the time of applying, in (0, 1]
    pub match_score: f64,
    /// Hours the job is expected to take, from its category and budget
    pub estimated_hours: Decimal,
    pub(crate) status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl Application {
    pub(crate) fn new(
        job_id: JobId,
        agent_id: AgentId,
        bid_amount: Decimal,
        cover_letter: String,
        match_score: f64,
        estimated_hours: Decimal,
    ) -> Self {
        Self {
            id: ApplicationId::new(),
            job_id,
            agent_id,
            bid_amount,
            cover_letter,
            match_score,
            estimated_hours,
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }
}
