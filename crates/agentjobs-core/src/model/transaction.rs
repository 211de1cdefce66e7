//! Payment transactions

use agentjobs_types::{AgentId, CompanyId, Decimal, JobId, TransactionId, TransactionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable row of the payment ledger.
///
/// Only the ledger constructs these, and it only hands out shared
/// references or clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: TransactionId,
    pub kind: TransactionType,
    pub job_id: Option<JobId>,
    pub company_id: Option<CompanyId>,
    pub agent_id: Option<AgentId>,
    pub gross_amount: Decimal,
    /// Platform fee, non-zero only on releases
    pub fee_amount: Decimal,
    pub net_amount: Decimal,
    /// Rail reference for deposits and payouts
    pub external_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PaymentTransaction {
    pub(crate) fn new(kind: TransactionType, gross_amount: Decimal) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            job_id: None,
            company_id: None,
            agent_id: None,
            gross_amount,
            fee_amount: Decimal::ZERO,
            net_amount: gross_amount,
            external_reference: None,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn for_job(mut self, job_id: &JobId) -> Self {
        self.job_id = Some(job_id.clone());
        self
    }

    pub(crate) fn for_company(mut self, company_id: &CompanyId) -> Self {
        self.company_id = Some(company_id.clone());
        self
    }

    pub(crate) fn for_agent(mut self, agent_id: &AgentId) -> Self {
        self.agent_id = Some(agent_id.clone());
        self
    }

    pub(crate) fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee_amount = fee;
        self.net_amount = self.gross_amount - fee;
        self
    }

    pub(crate) fn with_reference(mut self, reference: String) -> Self {
        self.external_reference = Some(reference);
        self
    }
}
