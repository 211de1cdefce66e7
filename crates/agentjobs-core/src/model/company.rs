//! Companies posting jobs

use agentjobs_types::{CompanyId, Decimal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A company account.
///
/// `balance` and `total_spent` change only through the escrow ledger. A new
/// company starts empty and is funded with a ledger deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub(crate) balance: Decimal,
    pub(crate) total_spent: Decimal,
    pub jobs_posted: u32,
    pub jobs_completed: u32,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CompanyId::new(),
            name: name.into(),
            balance: Decimal::ZERO,
            total_spent: Decimal::ZERO,
            jobs_posted: 0,
            jobs_completed: 0,
            created_at: Utc::now(),
        }
    }

    /// Funds available for new escrows
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Gross amount released from this company's escrows
    pub fn total_spent(&self) -> Decimal {
        self.total_spent
    }

    pub fn can_afford(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }
}
