//! Escrow Ledger - the only code path that moves money
//!
//! Funds live in three pools: company balances, job escrow and agent
//! pending payouts. The ledger moves money between them and appends exactly
//! one [`PaymentTransaction`] per movement.
//!
//! # Key Principle
//!
//! Every operation validates first and mutates second. A failed call leaves
//! every record it was handed untouched and appends nothing.
//!
//! # Conservation
//!
//! Escrow and refund move money between pools without changing the total.
//! Release removes the platform fee from the pools; the fee is recorded on
//! the release transaction only, and [`EscrowLedger::platform_revenue`]
//! sums it back up for reconciliation.

use agentjobs_types::{
    Decimal, JobId, MarketError, PaymentStatus, Result, TransactionId, TransactionType,
};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{AgentNode, Company, Job, PaymentTransaction};

// ============================================================================
// Fee Policy
// ============================================================================

/// Platform fee taken from every release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    platform_fee_percent: Decimal,
}

impl FeePolicy {
    pub const DEFAULT_PERCENT: Decimal = dec!(10);

    pub fn new(platform_fee_percent: Decimal) -> Result<Self> {
        if platform_fee_percent < Decimal::ZERO || platform_fee_percent > Decimal::ONE_HUNDRED {
            return Err(MarketError::invalid_input(
                "platform_fee_percent",
                format!("must be within 0..=100, got {}", platform_fee_percent),
            ));
        }
        Ok(Self {
            platform_fee_percent,
        })
    }

    pub fn percent(&self) -> Decimal {
        self.platform_fee_percent
    }

    /// Split a gross amount into `(fee, net)`; `fee + net == gross` exactly
    pub fn split(&self, gross: Decimal) -> (Decimal, Decimal) {
        let fee = gross * self.platform_fee_percent / Decimal::ONE_HUNDRED;
        (fee, gross - fee)
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            platform_fee_percent: Self::DEFAULT_PERCENT,
        }
    }
}

// ============================================================================
// Escrow Ledger
// ============================================================================

/// Append-only payment ledger plus the fee policy applied on release
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EscrowLedger {
    fees: FeePolicy,
    transactions: Vec<PaymentTransaction>,
}

impl EscrowLedger {
    pub fn new(fees: FeePolicy) -> Self {
        Self {
            fees,
            transactions: Vec::new(),
        }
    }

    pub fn fee_policy(&self) -> FeePolicy {
        self.fees
    }

    /// Move a job's budget from the company balance into escrow
    pub fn deposit_to_escrow(
        &mut self,
        job: &mut Job,
        company: &mut Company,
    ) -> Result<PaymentTransaction> {
        if !job.is_owned_by(&company.id) {
            return Err(MarketError::invalid_input(
                "company_id",
                format!("job {} is not owned by company {}", job.id, company.id),
            ));
        }
        if job.payment_status != PaymentStatus::Pending {
            return Err(MarketError::invalid_escrow(
                &job.id,
                job.payment_status,
                "escrow can only be funded once",
            ));
        }
        let budget = job.budget();
        if !company.can_afford(budget) {
            return Err(MarketError::InsufficientFunds {
                company_id: company.id.to_string(),
                requested: budget,
                available: company.balance,
            });
        }

        company.balance -= budget;
        job.escrow_amount = budget;
        job.payment_status = PaymentStatus::Escrowed;

        tracing::info!(
            job_id = %job.id,
            company_id = %company.id,
            amount = %budget,
            "escrow funded"
        );
        Ok(self.append(
            PaymentTransaction::new(TransactionType::Escrow, budget)
                .for_job(&job.id)
                .for_company(&company.id),
        ))
    }

    /// Pay the escrow out to the hired agent, minus the platform fee
    pub fn release_to_agent(
        &mut self,
        job: &mut Job,
        company: &mut Company,
        agent: &mut AgentNode,
    ) -> Result<PaymentTransaction> {
        self.ensure_escrowed(job, "release")?;
        if !job.is_owned_by(&company.id) {
            return Err(MarketError::invalid_input(
                "company_id",
                format!("job {} is not owned by company {}", job.id, company.id),
            ));
        }
        if job.hired_agent_id.as_ref() != Some(&agent.id) {
            return Err(MarketError::invalid_input(
                "agent_id",
                format!("agent {} is not hired on job {}", agent.id, job.id),
            ));
        }

        let gross = job.escrow_amount;
        let (fee, net) = self.fees.split(gross);

        agent.total_earned += net;
        agent.pending_payout += net;
        company.total_spent += gross;
        job.escrow_amount = Decimal::ZERO;
        job.payment_status = PaymentStatus::Released;

        tracing::info!(
            job_id = %job.id,
            agent_id = %agent.id,
            gross = %gross,
            fee = %fee,
            net = %net,
            "escrow released"
        );
        Ok(self.append(
            PaymentTransaction::new(TransactionType::Release, gross)
                .for_job(&job.id)
                .for_company(&company.id)
                .for_agent(&agent.id)
                .with_fee(fee),
        ))
    }

    /// Return the escrow to the company balance
    pub fn refund_to_company(
        &mut self,
        job: &mut Job,
        company: &mut Company,
    ) -> Result<PaymentTransaction> {
        self.ensure_escrowed(job, "refund")?;
        if !job.is_owned_by(&company.id) {
            return Err(MarketError::invalid_input(
                "company_id",
                format!("job {} is not owned by company {}", job.id, company.id),
            ));
        }

        let amount = job.escrow_amount;
        company.balance += amount;
        job.escrow_amount = Decimal::ZERO;
        job.payment_status = PaymentStatus::Refunded;

        tracing::info!(
            job_id = %job.id,
            company_id = %company.id,
            amount = %amount,
            "escrow refunded"
        );
        Ok(self.append(
            PaymentTransaction::new(TransactionType::Refund, amount)
                .for_job(&job.id)
                .for_company(&company.id),
        ))
    }

    /// Credit externally collected funds to a company balance
    pub(crate) fn credit_company(
        &mut self,
        company: &mut Company,
        amount: Decimal,
        reference: String,
    ) -> Result<PaymentTransaction> {
        ensure_positive("amount", amount)?;

        company.balance += amount;

        tracing::info!(company_id = %company.id, amount = %amount, "company funded");
        Ok(self.append(
            PaymentTransaction::new(TransactionType::Deposit, amount)
                .for_company(&company.id)
                .with_reference(reference),
        ))
    }

    /// Debit a disbursed payout from an agent's pending balance
    pub(crate) fn debit_payout(
        &mut self,
        agent: &mut AgentNode,
        amount: Decimal,
        reference: String,
    ) -> Result<PaymentTransaction> {
        ensure_payout_covered(agent, amount)?;

        agent.pending_payout -= amount;

        tracing::info!(agent_id = %agent.id, amount = %amount, "payout sent");
        Ok(self.append(
            PaymentTransaction::new(TransactionType::Payout, amount)
                .for_agent(&agent.id)
                .with_reference(reference),
        ))
    }

    pub fn transactions(&self) -> &[PaymentTransaction] {
        &self.transactions
    }

    pub fn get(&self, id: &TransactionId) -> Option<&PaymentTransaction> {
        self.transactions.iter().find(|tx| &tx.id == id)
    }

    pub fn transactions_for_job<'a>(
        &'a self,
        job_id: &'a JobId,
    ) -> impl Iterator<Item = &'a PaymentTransaction> + 'a {
        self.transactions
            .iter()
            .filter(move |tx| tx.job_id.as_ref() == Some(job_id))
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sum of fees withheld on releases
    pub fn platform_revenue(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|tx| tx.kind == TransactionType::Release)
            .map(|tx| tx.fee_amount)
            .sum()
    }

    /// Gross total of one transaction kind
    pub fn total_of(&self, kind: TransactionType) -> Decimal {
        self.transactions
            .iter()
            .filter(|tx| tx.kind == kind)
            .map(|tx| tx.gross_amount)
            .sum()
    }

    fn ensure_escrowed(&self, job: &Job, operation: &str) -> Result<()> {
        if job.payment_status != PaymentStatus::Escrowed || job.escrow_amount <= Decimal::ZERO {
            return Err(MarketError::invalid_escrow(
                &job.id,
                job.payment_status,
                format!("{} requires funds held in escrow", operation),
            ));
        }
        Ok(())
    }

    fn append(&mut self, tx: PaymentTransaction) -> PaymentTransaction {
        self.transactions.push(tx.clone());
        tx
    }
}

pub(crate) fn ensure_positive(field: &str, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(MarketError::invalid_input(
            field,
            format!("must be positive, got {}", amount),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_payout_covered(agent: &AgentNode, amount: Decimal) -> Result<()> {
    ensure_positive("amount", amount)?;
    if amount > agent.pending_payout {
        return Err(MarketError::InsufficientPayout {
            agent_id: agent.id.to_string(),
            requested: amount,
            pending: agent.pending_payout,
        });
    }
    Ok(())
}
