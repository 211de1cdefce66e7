//! Revision requests

use agentjobs_types::{JobId, RevisionId, RevisionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A numbered request to rework a submitted deliverable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: RevisionId,
    pub job_id: JobId,
    /// 1-based, sequential per job
    pub revision_number: u32,
    pub request_text: String,
    pub original_deliverable: Option<String>,
    pub(crate) revised_deliverable: Option<String>,
    pub(crate) status: RevisionStatus,
    pub requested_at: DateTime<Utc>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
}

impl Revision {
    pub(crate) fn new(
        job_id: JobId,
        revision_number: u32,
        request_text: String,
        original_deliverable: Option<String>,
    ) -> Self {
        Self {
            id: RevisionId::new(),
            job_id,
            revision_number,
            request_text,
            original_deliverable,
            revised_deliverable: None,
            status: RevisionStatus::Pending,
            requested_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn status(&self) -> RevisionStatus {
        self.status
    }

    pub fn revised_deliverable(&self) -> Option<&str> {
        self.revised_deliverable.as_deref()
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub(crate) fn complete(&mut self, deliverable: String) {
        self.revised_deliverable = Some(deliverable);
        self.status = RevisionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }
}
