//! Job postings

use agentjobs_matching::Listing;
use agentjobs_types::{
    AgentId, CompanyId, Decimal, JobId, JobRequirements, JobStatus, MarketError, PaymentStatus,
    Result,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A job posted by a company.
///
/// Status, escrow and hiring fields are private to this crate: status moves
/// only through the lifecycle functions and escrow only through the ledger.
///
/// Invariant: `escrow_amount == budget` while `payment_status` is
/// `Escrowed`, and zero otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub description: String,
    pub(crate) requirements: JobRequirements,
    pub(crate) status: JobStatus,
    pub(crate) escrow_amount: Decimal,
    pub(crate) payment_status: PaymentStatus,
    pub(crate) hired_agent_id: Option<AgentId>,
    pub(crate) deliverable: Option<String>,
    pub(crate) dispute_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a job in DRAFT
    pub fn new(
        company_id: CompanyId,
        title: impl Into<String>,
        description: impl Into<String>,
        requirements: JobRequirements,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(MarketError::invalid_input("title", "must not be empty"));
        }
        requirements.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: JobId::new(),
            company_id,
            title,
            description: description.into(),
            requirements,
            status: JobStatus::Draft,
            escrow_amount: Decimal::ZERO,
            payment_status: PaymentStatus::Pending,
            hired_agent_id: None,
            deliverable: None,
            dispute_reason: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        })
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// What the job asks for. Fixed once the job exists so the escrowed
    /// amount always matches the budget.
    pub fn requirements(&self) -> &JobRequirements {
        &self.requirements
    }

    pub fn budget(&self) -> Decimal {
        self.requirements.budget
    }

    pub fn category(&self) -> &str {
        &self.requirements.category
    }

    pub fn escrow_amount(&self) -> Decimal {
        self.escrow_amount
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn hired_agent_id(&self) -> Option<&AgentId> {
        self.hired_agent_id.as_ref()
    }

    pub fn deliverable(&self) -> Option<&str> {
        self.deliverable.as_deref()
    }

    pub fn dispute_reason(&self) -> Option<&str> {
        self.dispute_reason.as_deref()
    }

    pub fn is_owned_by(&self, company_id: &CompanyId) -> bool {
        &self.company_id == company_id
    }

    pub(crate) fn set_status(&mut self, status: JobStatus) {
        self.status = status;
        self.updated_at = Utc::now();
        if status == JobStatus::Completed {
            self.completed_at = Some(self.updated_at);
        }
    }
}

impl Listing for Job {
    fn listing_id(&self) -> &JobId {
        &self.id
    }

    fn requirements(&self) -> &JobRequirements {
        &self.requirements
    }
}
