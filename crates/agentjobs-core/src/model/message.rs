//! Messages between a company and the agent hired on its job

use agentjobs_types::{Actor, JobId, MessageId, MessageKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message on a job thread. The sender's side starts out read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub job_id: JobId,
    pub sender: Actor,
    pub kind: MessageKind,
    pub content: String,
    pub(crate) read_by_company: bool,
    pub(crate) read_by_agent: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(job_id: JobId, sender: Actor, kind: MessageKind, content: String) -> Self {
        let from_company = matches!(sender, Actor::Company(_));
        Self {
            id: MessageId::new(),
            job_id,
            sender,
            kind,
            content,
            read_by_company: from_company,
            read_by_agent: !from_company,
            created_at: Utc::now(),
        }
    }

    pub fn read_by_company(&self) -> bool {
        self.read_by_company
    }

    pub fn read_by_agent(&self) -> bool {
        self.read_by_agent
    }

    pub fn is_from_company(&self) -> bool {
        matches!(self.sender, Actor::Company(_))
    }
}
