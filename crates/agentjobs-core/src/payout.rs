//! Payment rails
//!
//! Money enters the marketplace as a company top-up and leaves it as an
//! agent payout. Both cross a [`PaymentRail`]; the simulated rail is the
//! default and an embedding application supplies its own for live payments.
//! Rails are synchronous: any provider round-trip happens before the ledger
//! is touched, so a refused movement never reaches the ledger.

use agentjobs_types::{AgentId, CompanyId, Decimal, MarketError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::escrow::{ensure_payout_covered, ensure_positive, EscrowLedger};
use crate::model::{AgentNode, Company, PaymentTransaction};

/// Which rail the marketplace runs on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    #[default]
    Simulated,
    /// A rail supplied by the embedding application
    External,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => f.write_str("simulated"),
            Self::External => f.write_str("external"),
        }
    }
}

impl FromStr for PaymentMode {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" => Ok(Self::Simulated),
            "external" => Ok(Self::External),
            other => Err(MarketError::invalid_input(
                "payments.mode",
                format!("unknown payment mode '{}'", other),
            )),
        }
    }
}

/// Confirmation from a rail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailReceipt {
    pub rail: String,
    /// Provider reference, stored on the ledger transaction
    pub reference: String,
}

/// A way of moving money in and out of the marketplace
pub trait PaymentRail: Send + Sync {
    fn name(&self) -> &str;

    /// Collect funds from a company
    fn collect(&self, company_id: &CompanyId, amount: Decimal) -> Result<RailReceipt>;

    /// Send funds to an agent
    fn disburse(&self, agent_id: &AgentId, amount: Decimal) -> Result<RailReceipt>;
}

/// In-process rail that accepts every movement
#[derive(Debug, Default)]
pub struct SimulatedRail {
    refuse_payouts: AtomicBool,
}

impl SimulatedRail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent disbursements fail (provider outage drills)
    pub fn set_refuse_payouts(&self, refuse: bool) {
        self.refuse_payouts.store(refuse, Ordering::SeqCst);
    }
}

impl PaymentRail for SimulatedRail {
    fn name(&self) -> &str {
        "simulated"
    }

    fn collect(&self, _company_id: &CompanyId, _amount: Decimal) -> Result<RailReceipt> {
        Ok(RailReceipt {
            rail: self.name().to_string(),
            reference: format!("sim_dep_{}", Uuid::new_v4().simple()),
        })
    }

    fn disburse(&self, agent_id: &AgentId, _amount: Decimal) -> Result<RailReceipt> {
        if self.refuse_payouts.load(Ordering::SeqCst) {
            return Err(MarketError::PaymentRail {
                message: format!("simulated rail refused payout to {}", agent_id),
            });
        }
        Ok(RailReceipt {
            rail: self.name().to_string(),
            reference: format!("sim_pay_{}", Uuid::new_v4().simple()),
        })
    }
}

/// Top up a company balance through a rail
pub fn add_funds(
    ledger: &mut EscrowLedger,
    rail: &dyn PaymentRail,
    company: &mut Company,
    amount: Decimal,
) -> Result<PaymentTransaction> {
    ensure_positive("amount", amount)?;
    let receipt = rail.collect(&company.id, amount)?;
    ledger.credit_company(company, amount, receipt.reference)
}

/// Pay part or all of an agent's pending payout through a rail
pub fn request_payout(
    ledger: &mut EscrowLedger,
    rail: &dyn PaymentRail,
    agent: &mut AgentNode,
    amount: Decimal,
) -> Result<PaymentTransaction> {
    ensure_payout_covered(agent, amount)?;
    let receipt = rail.disburse(&agent.id, amount)?;
    ledger.debit_payout(agent, amount, receipt.reference)
}
