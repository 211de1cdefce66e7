//! Agent nodes

use agentjobs_matching::Candidate;
use agentjobs_types::{
    AgentId, AgentStatus, Capabilities, Decimal, JobId, MarketError, Reputation, Result,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered agent node.
///
/// Payout fields are only moved by the escrow ledger; everything else is
/// plain registration data or reputation maintained by the lifecycle.
/// Agents are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentNode {
    pub id: AgentId,
    pub name: String,
    pub capabilities: Capabilities,
    /// Hourly rate, 0 when unpriced
    pub hourly_rate: Decimal,
    pub reputation: Reputation,
    pub status: AgentStatus,
    /// Job the agent is hired on, if any
    pub current_job_id: Option<JobId>,
    pub(crate) total_earned: Decimal,
    pub(crate) pending_payout: Decimal,
    pub registered_at: DateTime<Utc>,
    pub last_heartbeat: Option<DateTime<Utc>>,
}

impl AgentNode {
    pub fn new(name: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            capabilities,
            hourly_rate: Decimal::ZERO,
            reputation: Reputation::default(),
            status: AgentStatus::Offline,
            current_job_id: None,
            total_earned: Decimal::ZERO,
            pending_payout: Decimal::ZERO,
            registered_at: Utc::now(),
            last_heartbeat: None,
        }
    }

    pub fn with_hourly_rate(mut self, rate: Decimal) -> Self {
        self.hourly_rate = rate.max(Decimal::ZERO);
        self
    }

    pub fn with_reputation(mut self, reputation: Reputation) -> Self {
        self.reputation = reputation;
        self
    }

    /// Net earnings over the agent's lifetime
    pub fn total_earned(&self) -> Decimal {
        self.total_earned
    }

    /// Earnings not yet paid out
    pub fn pending_payout(&self) -> Decimal {
        self.pending_payout
    }

    pub fn is_busy(&self) -> bool {
        self.current_job_id.is_some()
    }

    /// Online and not hired on anything
    pub fn is_available(&self) -> bool {
        self.status == AgentStatus::Online && !self.is_busy()
    }

    /// Record a heartbeat. Busy is derived from hiring and cannot be
    /// reported; a hired agent stays Busy whatever it reports.
    pub fn heartbeat(&mut self, status: AgentStatus) -> Result<()> {
        if status == AgentStatus::Busy {
            return Err(MarketError::invalid_input(
                "status",
                "agents report online or offline; busy is set by hiring",
            ));
        }
        self.last_heartbeat = Some(Utc::now());
        if !self.is_busy() {
            self.status = status;
        }
        Ok(())
    }

    pub(crate) fn assign(&mut self, job_id: JobId) {
        self.current_job_id = Some(job_id);
        self.status = AgentStatus::Busy;
    }

    pub(crate) fn release(&mut self) {
        self.current_job_id = None;
        self.status = AgentStatus::Online;
    }
}

impl Candidate for AgentNode {
    fn candidate_id(&self) -> &AgentId {
        &self.id
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn reputation(&self) -> &Reputation {
        &self.reputation
    }

    fn hourly_rate(&self) -> Decimal {
        self.hourly_rate
    }
}
