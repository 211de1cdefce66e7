//! Status enums for jobs, payments, applications, agents and revisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Job lifecycle state
///
/// ```text
/// DRAFT → OPEN → IN_PROGRESS → PENDING_REVIEW → COMPLETED
///                     ↑               │
///                     └── revision ───┤
///                                     └→ DISPUTED
/// DRAFT/OPEN → CANCELLED
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Draft,
    Open,
    InProgress,
    PendingReview,
    Completed,
    Cancelled,
    Disputed,
}

impl JobStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the job has not yet been hired
    pub fn is_pre_hire(&self) -> bool {
        matches!(self, Self::Draft | Self::Open)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::PendingReview => "pending_review",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Disputed => "disputed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations that drive the job lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    Publish,
    Apply,
    WithdrawApplication,
    Hire,
    SubmitDeliverable,
    StartRevision,
    Approve,
    RequestRevision,
    Dispute,
    Cancel,
    ResolveDispute,
    SendMessage,
    ReadMessages,
}

impl JobAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Apply => "apply",
            Self::WithdrawApplication => "withdraw_application",
            Self::Hire => "hire",
            Self::SubmitDeliverable => "submit_deliverable",
            Self::StartRevision => "start_revision",
            Self::Approve => "approve",
            Self::RequestRevision => "request_revision",
            Self::Dispute => "dispute",
            Self::Cancel => "cancel",
            Self::ResolveDispute => "resolve_dispute",
            Self::SendMessage => "send_message",
            Self::ReadMessages => "read_messages",
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a job's money currently sits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing deposited yet
    #[default]
    Pending,
    /// Budget held in job escrow
    Escrowed,
    /// Escrow paid out to the hired agent
    Released,
    /// Escrow returned to the company
    Refunded,
    /// Payment contested with an external payment provider
    Disputed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Escrowed => "escrowed",
            Self::Released => "released",
            Self::Refunded => "refunded",
            Self::Disputed => "disputed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    /// Withdrawn applications do not count towards the one-per-agent rule
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Withdrawn)
    }
}

/// Agent availability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Online,
    #[default]
    Offline,
    Busy,
}

/// Revision request state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl RevisionStatus {
    /// Pending or acknowledged revisions are still awaiting a resubmission
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

/// What a job message is for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    /// Extra direction from the company; company only
    Instruction,
    /// Clarifying question from the hired agent; agent only
    Question,
}

/// Kind of money movement recorded in the payment ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Company balance → job escrow
    Escrow,
    /// Job escrow → agent pending payout (minus platform fee)
    Release,
    /// Job escrow → company balance
    Refund,
    /// External funds → company balance
    Deposit,
    /// Agent pending payout → external wallet
    Payout,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Escrow => "escrow",
            Self::Release => "release",
            Self::Refund => "refund",
            Self::Deposit => "deposit",
            Self::Payout => "payout",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
