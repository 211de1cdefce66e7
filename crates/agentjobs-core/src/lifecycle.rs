//! Job Lifecycle State Machine
//!
//! ```text
//! DRAFT → OPEN → IN_PROGRESS → PENDING_REVIEW → COMPLETED
//!                     ↑               │
//!                     └── revision ───┤
//!                                     └→ DISPUTED → COMPLETED | CANCELLED
//! DRAFT/OPEN → CANCELLED
//! ```
//!
//! Each transition checks state, actor and inputs before anything is
//! touched, then calls into the escrow ledger (which validates again before
//! it mutates), and only then applies the remaining infallible updates. A
//! rejected transition is an error, never a silent no-op.
//!
//! The functions here operate on records the caller has already locked.

use agentjobs_matching::{estimate_job_hours, score};
use agentjobs_types::{
    Actor, ApplicationId, ApplicationStatus, Decimal, JobAction, JobStatus, MarketError,
    PaymentStatus, Result, RevisionStatus,
};
use serde::{Deserialize, Serialize};

use crate::escrow::{ensure_positive, EscrowLedger};
use crate::model::{
    AgentNode, Application, Company, Job, PaymentTransaction, Review, ReviewScores, Revision,
};
use crate::reputation;

/// Length limits on opaque free text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLimits {
    pub max_deliverable_chars: usize,
    pub max_cover_letter_chars: usize,
    pub max_request_chars: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            max_deliverable_chars: 50_000,
            max_cover_letter_chars: 5_000,
            max_request_chars: 5_000,
        }
    }
}

pub(crate) fn check_length(field: &str, text: &str, max: usize) -> Result<()> {
    let len = text.chars().count();
    if len > max {
        return Err(MarketError::invalid_input(
            field,
            format!("{} characters exceeds the limit of {}", len, max),
        ));
    }
    Ok(())
}

pub(crate) fn require_status(job: &Job, action: JobAction, allowed: &[JobStatus]) -> Result<()> {
    if allowed.contains(&job.status) {
        return Ok(());
    }
    let expected: Vec<&str> = allowed.iter().map(JobStatus::as_str).collect();
    Err(MarketError::invalid_transition(
        &job.id,
        job.status,
        action,
        format!("requires status {}", expected.join(" or ")),
    ))
}

pub(crate) fn require_owner(job: &Job, actor: &Actor, action: JobAction) -> Result<()> {
    if actor.is_company(&job.company_id) {
        return Ok(());
    }
    Err(MarketError::invalid_transition(
        &job.id,
        job.status,
        action,
        format!("only the job owner may {}, not {}", action, actor),
    ))
}

pub(crate) fn require_hired_agent(job: &Job, actor: &Actor, action: JobAction) -> Result<()> {
    match &job.hired_agent_id {
        Some(agent_id) if actor.is_agent(agent_id) => Ok(()),
        _ => Err(MarketError::invalid_transition(
            &job.id,
            job.status,
            action,
            format!("only the hired agent may {}, not {}", action, actor),
        )),
    }
}

fn require_agent_matches(job: &Job, agent: &AgentNode) -> Result<()> {
    if job.hired_agent_id.as_ref() == Some(&agent.id) {
        return Ok(());
    }
    Err(MarketError::invalid_input(
        "agent_id",
        format!("agent {} is not hired on job {}", agent.id, job.id),
    ))
}

fn log_transition(job: &Job, from: JobStatus, action: JobAction) {
    tracing::info!(
        job_id = %job.id,
        from = %from,
        to = %job.status,
        action = %action,
        "job transition"
    );
}

// ============================================================================
// Posting
// ============================================================================

/// DRAFT → OPEN, escrowing the budget
pub fn publish(
    job: &mut Job,
    company: &mut Company,
    actor: &Actor,
    ledger: &mut EscrowLedger,
) -> Result<PaymentTransaction> {
    require_status(job, JobAction::Publish, &[JobStatus::Draft])?;
    require_owner(job, actor, JobAction::Publish)?;

    let tx = ledger.deposit_to_escrow(job, company)?;

    let from = job.status;
    job.set_status(JobStatus::Open);
    log_transition(job, from, JobAction::Publish);
    Ok(tx)
}

/// DRAFT/OPEN → CANCELLED, refunding any escrow and rejecting pending bids
pub fn cancel(
    job: &mut Job,
    company: &mut Company,
    applications: &mut [Application],
    actor: &Actor,
    ledger: &mut EscrowLedger,
) -> Result<Option<PaymentTransaction>> {
    require_status(job, JobAction::Cancel, &[JobStatus::Draft, JobStatus::Open])?;
    require_owner(job, actor, JobAction::Cancel)?;

    let refund = if job.payment_status == PaymentStatus::Escrowed {
        Some(ledger.refund_to_company(job, company)?)
    } else {
        None
    };

    for application in applications.iter_mut().filter(|a| a.is_pending()) {
        application.status = ApplicationStatus::Rejected;
    }
    let from = job.status;
    job.set_status(JobStatus::Cancelled);
    log_transition(job, from, JobAction::Cancel);
    Ok(refund)
}

// ============================================================================
// Applications
// ============================================================================

/// Bid on an OPEN job. No state change; the application is appended.
pub fn apply(
    job: &Job,
    applications: &mut Vec<Application>,
    agent: &AgentNode,
    bid_amount: Decimal,
    cover_letter: String,
    limits: &TextLimits,
) -> Result<Application> {
    require_status(job, JobAction::Apply, &[JobStatus::Open])?;
    if applications
        .iter()
        .any(|a| a.agent_id == agent.id && a.status.is_active())
    {
        return Err(MarketError::DuplicateApplication {
            agent_id: agent.id.to_string(),
            job_id: job.id.to_string(),
        });
    }
    ensure_positive("bid_amount", bid_amount)?;
    check_length("cover_letter", &cover_letter, limits.max_cover_letter_chars)?;

    let match_score = score(agent, &job.requirements);
    if let Some(reason) = &match_score.disqualification {
        return Err(MarketError::invalid_transition(
            &job.id,
            job.status,
            JobAction::Apply,
            format!("agent {} is not eligible: {}", agent.id, reason),
        ));
    }

    let application = Application::new(
        job.id.clone(),
        agent.id.clone(),
        bid_amount,
        cover_letter,
        match_score.value,
        estimate_job_hours(job.category(), job.budget()),
    );
    tracing::info!(
        job_id = %job.id,
        agent_id = %agent.id,
        bid = %bid_amount,
        match_score = match_score.value,
        "application received"
    );
    applications.push(application.clone());
    Ok(application)
}

/// PENDING → WITHDRAWN, by the applicant
pub fn withdraw_application(
    job: &Job,
    applications: &mut [Application],
    application_id: &ApplicationId,
    actor: &Actor,
) -> Result<()> {
    let application = applications
        .iter_mut()
        .find(|a| &a.id == application_id)
        .ok_or_else(|| MarketError::not_found("Application", application_id))?;

    if !actor.is_agent(&application.agent_id) {
        return Err(MarketError::invalid_transition(
            &job.id,
            job.status,
            JobAction::WithdrawApplication,
            format!("only the applicant may withdraw, not {}", actor),
        ));
    }
    if !application.is_pending() {
        return Err(MarketError::invalid_transition(
            &job.id,
            job.status,
            JobAction::WithdrawApplication,
            format!("application is already {:?}", application.status).to_lowercase(),
        ));
    }

    application.status = ApplicationStatus::Withdrawn;
    tracing::info!(job_id = %job.id, application_id = %application_id, "application withdrawn");
    Ok(())
}

// ============================================================================
// Hiring and delivery
// ============================================================================

/// OPEN → IN_PROGRESS: accept one application, reject the other pending ones
pub fn hire(
    job: &mut Job,
    applications: &mut [Application],
    application_id: &ApplicationId,
    agent: &mut AgentNode,
    actor: &Actor,
) -> Result<()> {
    require_status(job, JobAction::Hire, &[JobStatus::Open])?;
    require_owner(job, actor, JobAction::Hire)?;
    if job.payment_status != PaymentStatus::Escrowed {
        return Err(MarketError::invalid_escrow(
            &job.id,
            job.payment_status,
            "hiring requires a funded escrow",
        ));
    }

    let application = applications
        .iter()
        .find(|a| &a.id == application_id)
        .ok_or_else(|| MarketError::not_found("Application", application_id))?;
    if application.job_id != job.id {
        return Err(MarketError::invalid_transition(
            &job.id,
            job.status,
            JobAction::Hire,
            format!("application {} belongs to job {}", application.id, application.job_id),
        ));
    }
    if !application.is_pending() {
        return Err(MarketError::invalid_transition(
            &job.id,
            job.status,
            JobAction::Hire,
            format!("application {} is not pending", application.id),
        ));
    }
    if application.agent_id != agent.id {
        return Err(MarketError::invalid_input(
            "agent_id",
            format!("application {} was made by another agent", application.id),
        ));
    }
    if let Some(current) = &agent.current_job_id {
        return Err(MarketError::invalid_transition(
            &job.id,
            job.status,
            JobAction::Hire,
            format!("agent {} is busy on job {}", agent.id, current),
        ));
    }

    for application in applications.iter_mut() {
        if &application.id == application_id {
            application.status = ApplicationStatus::Accepted;
        } else if application.is_pending() {
            application.status = ApplicationStatus::Rejected;
        }
    }
    job.hired_agent_id = Some(agent.id.clone());
    agent.assign(job.id.clone());

    let from = job.status;
    job.set_status(JobStatus::InProgress);
    log_transition(job, from, JobAction::Hire);
    Ok(())
}

/// IN_PROGRESS → PENDING_REVIEW, by the hired agent.
///
/// If a revision is open, the submission completes it.
pub fn submit_deliverable(
    job: &mut Job,
    revisions: &mut [Revision],
    actor: &Actor,
    deliverable: String,
    limits: &TextLimits,
) -> Result<()> {
    require_status(job, JobAction::SubmitDeliverable, &[JobStatus::InProgress])?;
    require_hired_agent(job, actor, JobAction::SubmitDeliverable)?;
    if deliverable.trim().is_empty() {
        return Err(MarketError::invalid_input("deliverable", "must not be empty"));
    }
    check_length("deliverable", &deliverable, limits.max_deliverable_chars)?;

    if let Some(revision) = revisions.iter_mut().rev().find(|r| r.status.is_open()) {
        revision.complete(deliverable.clone());
    }
    job.deliverable = Some(deliverable);

    let from = job.status;
    job.set_status(JobStatus::PendingReview);
    log_transition(job, from, JobAction::SubmitDeliverable);
    Ok(())
}

// ============================================================================
// Review
// ============================================================================

/// Outcome of an approval
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub transaction: PaymentTransaction,
    pub review: Review,
}

/// PENDING_REVIEW → COMPLETED: release escrow, record the review, update
/// reputation and free the agent.
///
/// `agent_reviews` is the agent's full review history; the new review is
/// appended to it.
#[allow(clippy::too_many_arguments)]
pub fn approve(
    job: &mut Job,
    company: &mut Company,
    agent: &mut AgentNode,
    agent_reviews: &mut Vec<Review>,
    actor: &Actor,
    scores: ReviewScores,
    comment: Option<String>,
    ledger: &mut EscrowLedger,
) -> Result<Completion> {
    require_status(job, JobAction::Approve, &[JobStatus::PendingReview])?;
    require_owner(job, actor, JobAction::Approve)?;
    require_agent_matches(job, agent)?;
    scores.validate()?;

    let transaction = ledger.release_to_agent(job, company, agent)?;

    let review = Review::new(
        job.id.clone(),
        agent.id.clone(),
        company.id.clone(),
        scores,
        comment,
    );
    agent_reviews.push(review.clone());

    let from = job.status;
    job.set_status(JobStatus::Completed);
    company.jobs_completed += 1;
    agent.reputation.jobs_completed += 1;
    reputation::recompute(agent, agent_reviews);
    agent.release();
    log_transition(job, from, JobAction::Approve);

    Ok(Completion {
        transaction,
        review,
    })
}

/// PENDING_REVIEW → IN_PROGRESS with a new numbered revision
pub fn request_revision(
    job: &mut Job,
    revisions: &mut Vec<Revision>,
    actor: &Actor,
    request_text: String,
    limits: &TextLimits,
) -> Result<Revision> {
    require_status(job, JobAction::RequestRevision, &[JobStatus::PendingReview])?;
    require_owner(job, actor, JobAction::RequestRevision)?;
    if request_text.trim().is_empty() {
        return Err(MarketError::invalid_input("request_text", "must not be empty"));
    }
    check_length("request_text", &request_text, limits.max_request_chars)?;

    let revision = Revision::new(
        job.id.clone(),
        revisions.len() as u32 + 1,
        request_text,
        job.deliverable.clone(),
    );
    revisions.push(revision.clone());

    let from = job.status;
    job.set_status(JobStatus::InProgress);
    log_transition(job, from, JobAction::RequestRevision);
    Ok(revision)
}

/// The hired agent acknowledges the latest revision (PENDING → IN_PROGRESS)
pub fn start_revision(job: &Job, revisions: &mut [Revision], actor: &Actor) -> Result<()> {
    require_status(job, JobAction::StartRevision, &[JobStatus::InProgress])?;
    require_hired_agent(job, actor, JobAction::StartRevision)?;

    match revisions.last_mut() {
        Some(revision) if revision.status == RevisionStatus::Pending => {
            revision.status = RevisionStatus::InProgress;
            tracing::info!(
                job_id = %job.id,
                revision = revision.revision_number,
                "revision started"
            );
            Ok(())
        }
        _ => Err(MarketError::invalid_transition(
            &job.id,
            job.status,
            JobAction::StartRevision,
            "no pending revision",
        )),
    }
}

// ============================================================================
// Disputes
// ============================================================================

/// How the platform settles a dispute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeDecision {
    /// Pay the agent (fee applies) and complete the job
    ReleaseToAgent,
    /// Return the escrow and cancel the job
    RefundCompany,
}

/// PENDING_REVIEW → DISPUTED, by the owner or the hired agent.
/// Escrow stays held until the platform resolves it.
pub fn dispute(job: &mut Job, actor: &Actor, reason: String, limits: &TextLimits) -> Result<()> {
    require_status(job, JobAction::Dispute, &[JobStatus::PendingReview])?;
    if require_owner(job, actor, JobAction::Dispute).is_err() {
        require_hired_agent(job, actor, JobAction::Dispute)?;
    }
    check_length("reason", &reason, limits.max_request_chars)?;

    job.dispute_reason = Some(reason);
    let from = job.status;
    job.set_status(JobStatus::Disputed);
    tracing::warn!(job_id = %job.id, raised_by = %actor, "job disputed");
    log_transition(job, from, JobAction::Dispute);
    Ok(())
}

/// DISPUTED → COMPLETED or CANCELLED, by the platform
pub fn resolve_dispute(
    job: &mut Job,
    company: &mut Company,
    agent: &mut AgentNode,
    actor: &Actor,
    decision: DisputeDecision,
    ledger: &mut EscrowLedger,
) -> Result<PaymentTransaction> {
    require_status(job, JobAction::ResolveDispute, &[JobStatus::Disputed])?;
    if *actor != Actor::Platform {
        return Err(MarketError::invalid_transition(
            &job.id,
            job.status,
            JobAction::ResolveDispute,
            format!("only the platform may resolve disputes, not {}", actor),
        ));
    }
    require_agent_matches(job, agent)?;

    let from = job.status;
    let transaction = match decision {
        DisputeDecision::ReleaseToAgent => {
            let tx = ledger.release_to_agent(job, company, agent)?;
            job.set_status(JobStatus::Completed);
            company.jobs_completed += 1;
            agent.reputation.jobs_completed += 1;
            tx
        }
        DisputeDecision::RefundCompany => {
            let tx = ledger.refund_to_company(job, company)?;
            job.set_status(JobStatus::Cancelled);
            agent.reputation.jobs_failed += 1;
            tx
        }
    };
    agent.release();
    log_transition(job, from, JobAction::ResolveDispute);
    Ok(transaction)
}
