//! Error types for AgentJobs
//!
//! Every business-rule violation is an explicit error kind. None of them is
//! transient: retrying with the same input reproduces the same failure, so
//! nothing here is retried automatically.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{JobAction, JobStatus, PaymentStatus};

/// Result type for AgentJobs operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// AgentJobs error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    // ========================================================================
    // Lifecycle Errors
    // ========================================================================

    /// Operation not permitted from the job's current state, or by this actor
    #[error("Cannot {action} job {job_id} in state {from}: {reason}")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        action: JobAction,
        reason: String,
    },

    /// Agent already holds a non-withdrawn application for the job
    #[error("Agent {agent_id} already applied to job {job_id}")]
    DuplicateApplication { agent_id: String, job_id: String },

    // ========================================================================
    // Escrow Errors
    // ========================================================================

    /// Company balance does not cover the job budget
    #[error("Insufficient funds in company {company_id}: requested {requested}, available {available}")]
    InsufficientFunds {
        company_id: String,
        requested: Decimal,
        available: Decimal,
    },

    /// Release or refund attempted while the job is not escrowed
    #[error("Escrow for job {job_id} is {payment_status}: {reason}")]
    InvalidEscrowState {
        job_id: String,
        payment_status: PaymentStatus,
        reason: String,
    },

    // ========================================================================
    // Payout Errors
    // ========================================================================

    /// Payout request exceeds the agent's pending payout balance
    #[error("Insufficient payout balance for agent {agent_id}: requested {requested}, pending {pending}")]
    InsufficientPayout {
        agent_id: String,
        requested: Decimal,
        pending: Decimal,
    },

    /// The payment rail refused the movement
    #[error("Payment rail error: {message}")]
    PaymentRail { message: String },

    // ========================================================================
    // General Errors
    // ========================================================================

    /// Referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Invalid input
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },
}

impl MarketError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_transition(
        job_id: impl ToString,
        from: JobStatus,
        action: JobAction,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            job_id: job_id.to_string(),
            from,
            action,
            reason: reason.into(),
        }
    }

    pub fn invalid_escrow(
        job_id: impl ToString,
        payment_status: PaymentStatus,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidEscrowState {
            job_id: job_id.to_string(),
            payment_status,
            reason: reason.into(),
        }
    }

    /// Business-rule errors are never transient
    pub fn is_retriable(&self) -> bool {
        false
    }

    /// Get an error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::DuplicateApplication { .. } => "DUPLICATE_APPLICATION",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InvalidEscrowState { .. } => "INVALID_ESCROW_STATE",
            Self::InsufficientPayout { .. } => "INSUFFICIENT_PAYOUT",
            Self::PaymentRail { .. } => "PAYMENT_RAIL_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidInput { .. } => "INVALID_INPUT",
        }
    }

    /// Stable HTTP status the API layer maps this error to
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidTransition { .. }
            | Self::DuplicateApplication { .. }
            | Self::InvalidEscrowState { .. } => 409,
            Self::InsufficientFunds { .. } | Self::InsufficientPayout { .. } => 402,
            Self::InvalidInput { .. } => 422,
            Self::PaymentRail { .. } => 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        let err = MarketError::InsufficientFunds {
            company_id: "company_1".to_string(),
            requested: dec!(150),
            available: dec!(100),
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");
        assert_eq!(err.http_status(), 402);
        assert!(err.to_string().contains("requested 150"));
    }

    #[test]
    fn test_transition_message() {
        let err = MarketError::invalid_transition(
            "job_1",
            JobStatus::InProgress,
            JobAction::Hire,
            "job is not open for hiring",
        );
        assert_eq!(
            err.to_string(),
            "Cannot hire job job_1 in state in_progress: job is not open for hiring"
        );
        assert_eq!(err.http_status(), 409);
    }

    #[test]
    fn test_nothing_is_retriable() {
        assert!(!MarketError::not_found("Job", "job_1").is_retriable());
        assert!(!MarketError::invalid_input("bid_amount", "must be positive").is_retriable());
        assert_eq!(MarketError::not_found("Job", "job_1").http_status(), 404);
    }
}
