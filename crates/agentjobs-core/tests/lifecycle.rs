use agentjobs_core::lifecycle::{self, DisputeDecision, TextLimits};
use agentjobs_core::payout::{add_funds, request_payout};
use agentjobs_core::{
    AgentNode, Application, Company, EscrowLedger, FeePolicy, Job, Review, ReviewScores,
    Revision, SimulatedRail,
};
use agentjobs_types::{
    Actor, AgentStatus, ApplicationStatus, Capabilities, Decimal, JobRequirements, JobStatus,
    MarketError, PaymentStatus, RevisionStatus, TransactionType, TrustLevel,
};
use rust_decimal_macros::dec;

struct World {
    ledger: EscrowLedger,
    rail: SimulatedRail,
    company: Company,
    owner: Actor,
    limits: TextLimits,
}

impl World {
    fn with_balance(balance: Decimal) -> Self {
        let mut ledger = EscrowLedger::new(FeePolicy::new(dec!(10)).unwrap());
        let rail = SimulatedRail::new();
        let mut company = Company::new("Acme Support");
        add_funds(&mut ledger, &rail, &mut company, balance).unwrap();
        let owner = Actor::Company(company.id.clone());
        Self {
            ledger,
            rail,
            company,
            owner,
            limits: TextLimits::default(),
        }
    }

    fn draft(&self, budget: Decimal) -> Job {
        Job::new(
            self.company.id.clone(),
            "Answer tickets",
            "Clear the support queue",
            JobRequirements::new("support", budget)
                .with_required_tools(["email"])
                .with_min_context(16_000),
        )
        .unwrap()
    }

    fn open(&mut self, budget: Decimal) -> Job {
        let mut job = self.draft(budget);
        lifecycle::publish(&mut job, &mut self.company, &self.owner, &mut self.ledger).unwrap();
        job
    }
}

fn support_agent(name: &str) -> AgentNode {
    AgentNode::new(
        name,
        Capabilities::new()
            .with_context_window(32_000)
            .with_tools(["email", "crm"]),
    )
}

fn apply(
    world: &World,
    job: &Job,
    applications: &mut Vec<Application>,
    agent: &AgentNode,
) -> Application {
    lifecycle::apply(
        job,
        applications,
        agent,
        dec!(40),
        "I can do this".to_string(),
        &world.limits,
    )
    .unwrap()
}

/// Job hired to `agent` and sitting in PENDING_REVIEW
fn delivered(world: &mut World, budget: Decimal, agent: &mut AgentNode) -> (Job, Vec<Revision>) {
    let mut job = world.open(budget);
    let mut applications = Vec::new();
    let application = apply(world, &job, &mut applications, agent);
    lifecycle::hire(&mut job, &mut applications, &application.id, agent, &world.owner).unwrap();

    let mut revisions = Vec::new();
    lifecycle::submit_deliverable(
        &mut job,
        &mut revisions,
        &Actor::Agent(agent.id.clone()),
        "All tickets answered".to_string(),
        &world.limits,
    )
    .unwrap();
    (job, revisions)
}

#[test]
fn test_full_lifecycle_pays_agent_net_of_fee() {
    let mut world = World::with_balance(dec!(500));
    let mut agent = support_agent("helper");
    let (mut job, _) = delivered(&mut world, dec!(100), &mut agent);
    let mut reviews: Vec<Review> = Vec::new();

    let completion = lifecycle::approve(
        &mut job,
        &mut world.company,
        &mut agent,
        &mut reviews,
        &world.owner,
        ReviewScores::new(5, 4, 3),
        Some("solid".to_string()),
        &mut world.ledger,
    )
    .unwrap();

    assert_eq!(job.status(), JobStatus::Completed);
    assert!(job.completed_at.is_some());
    assert_eq!(job.payment_status(), PaymentStatus::Released);
    assert_eq!(job.escrow_amount(), Decimal::ZERO);

    assert_eq!(completion.transaction.fee_amount, dec!(10));
    assert_eq!(completion.transaction.net_amount, dec!(90));
    assert_eq!(agent.pending_payout(), dec!(90));
    assert_eq!(agent.total_earned(), dec!(90));
    assert_eq!(world.company.total_spent(), dec!(100));
    assert_eq!(world.company.balance(), dec!(400));
    assert_eq!(world.company.jobs_completed, 1);

    assert_eq!(completion.review.overall_score, 4.0);
    assert_eq!(reviews.len(), 1);
    assert_eq!(agent.reputation.rating, 4.0);
    assert_eq!(agent.reputation.jobs_completed, 1);
    assert_eq!(agent.status, AgentStatus::Online);
    assert!(agent.current_job_id.is_none());

    assert_eq!(world.ledger.platform_revenue(), dec!(10));
}

#[test]
fn test_publish_without_funds_fails_and_keeps_balance() {
    let mut world = World::with_balance(dec!(100));
    let mut job = world.draft(dec!(150));

    let err = lifecycle::publish(&mut job, &mut world.company, &world.owner, &mut world.ledger)
        .unwrap_err();

    assert!(matches!(err, MarketError::InsufficientFunds { .. }));
    assert_eq!(world.company.balance(), dec!(100));
    assert_eq!(job.status(), JobStatus::Draft);
    assert_eq!(job.payment_status(), PaymentStatus::Pending);
    assert_eq!(world.ledger.len(), 1);
}

#[test]
fn test_publish_by_stranger_is_invalid_transition() {
    let mut world = World::with_balance(dec!(100));
    let mut job = world.draft(dec!(50));
    let stranger = Actor::Company(Company::new("Other").id);

    let err = lifecycle::publish(&mut job, &mut world.company, &stranger, &mut world.ledger)
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TRANSITION");
    assert_eq!(world.company.balance(), dec!(100));
}

#[test]
fn test_apply_twice_is_duplicate_until_withdrawn() {
    let mut world = World::with_balance(dec!(100));
    let job = world.open(dec!(50));
    let agent = support_agent("eager");
    let mut applications = Vec::new();
    let first = apply(&world, &job, &mut applications, &agent);

    let err = lifecycle::apply(
        &job,
        &mut applications,
        &agent,
        dec!(45),
        String::new(),
        &world.limits,
    )
    .unwrap_err();
    assert!(matches!(err, MarketError::DuplicateApplication { .. }));
    assert_eq!(applications.len(), 1);

    lifecycle::withdraw_application(
        &job,
        &mut applications,
        &first.id,
        &Actor::Agent(agent.id.clone()),
    )
    .unwrap();
    assert_eq!(applications[0].status(), ApplicationStatus::Withdrawn);

    apply(&world, &job, &mut applications, &agent);
    assert_eq!(applications.len(), 2);
}

#[test]
fn test_apply_requires_eligibility_and_open_job() {
    let mut world = World::with_balance(dec!(100));
    let draft = world.draft(dec!(50));
    let agent = support_agent("early");
    let mut applications = Vec::new();

    let err = lifecycle::apply(&draft, &mut applications, &agent, dec!(10), String::new(), &world.limits)
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TRANSITION");

    let job = world.open(dec!(50));
    let no_email = AgentNode::new("mute", Capabilities::new().with_context_window(32_000));
    let err = lifecycle::apply(&job, &mut applications, &no_email, dec!(10), String::new(), &world.limits)
        .unwrap_err();
    assert!(err.to_string().contains("not eligible"));

    let err = lifecycle::apply(&job, &mut applications, &agent, dec!(0), String::new(), &world.limits)
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");

    let letter = "x".repeat(world.limits.max_cover_letter_chars + 1);
    assert!(lifecycle::apply(&job, &mut applications, &agent, dec!(10), letter, &world.limits).is_err());
    assert!(applications.is_empty());
}

#[test]
fn test_hire_rejects_siblings_and_second_hire_fails() {
    let mut world = World::with_balance(dec!(100));
    let mut job = world.open(dec!(50));
    let mut first = support_agent("first");
    let mut second = support_agent("second");
    let mut applications = Vec::new();
    let a1 = apply(&world, &job, &mut applications, &first);
    let a2 = apply(&world, &job, &mut applications, &second);

    lifecycle::hire(&mut job, &mut applications, &a1.id, &mut first, &world.owner).unwrap();

    assert_eq!(job.status(), JobStatus::InProgress);
    assert_eq!(job.hired_agent_id(), Some(&first.id));
    assert_eq!(first.status, AgentStatus::Busy);
    assert_eq!(first.current_job_id.as_ref(), Some(&job.id));
    assert_eq!(applications[0].status(), ApplicationStatus::Accepted);
    assert_eq!(applications[1].status(), ApplicationStatus::Rejected);

    let err = lifecycle::hire(&mut job, &mut applications, &a2.id, &mut second, &world.owner)
        .unwrap_err();
    assert!(matches!(
        err,
        MarketError::InvalidTransition {
            from: JobStatus::InProgress,
            ..
        }
    ));
    assert_eq!(job.hired_agent_id(), Some(&first.id));
    assert!(second.current_job_id.is_none());
}

#[test]
fn test_only_hired_agent_submits() {
    let mut world = World::with_balance(dec!(100));
    let mut job = world.open(dec!(50));
    let mut agent = support_agent("worker");
    let mut applications = Vec::new();
    let application = apply(&world, &job, &mut applications, &agent);
    lifecycle::hire(&mut job, &mut applications, &application.id, &mut agent, &world.owner).unwrap();

    let mut revisions = Vec::new();
    let err = lifecycle::submit_deliverable(
        &mut job,
        &mut revisions,
        &world.owner,
        "done".to_string(),
        &world.limits,
    )
    .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TRANSITION");

    let err = lifecycle::submit_deliverable(
        &mut job,
        &mut revisions,
        &Actor::Agent(agent.id.clone()),
        "   ".to_string(),
        &world.limits,
    )
    .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert_eq!(job.status(), JobStatus::InProgress);
}

#[test]
fn test_revision_loop() {
    let mut world = World::with_balance(dec!(100));
    let mut agent = support_agent("iterate");
    let (mut job, mut revisions) = delivered(&mut world, dec!(80), &mut agent);
    let agent_actor = Actor::Agent(agent.id.clone());

    let first = lifecycle::request_revision(
        &mut job,
        &mut revisions,
        &world.owner,
        "Add ticket numbers".to_string(),
        &world.limits,
    )
    .unwrap();
    assert_eq!(first.revision_number, 1);
    assert_eq!(first.original_deliverable.as_deref(), Some("All tickets answered"));
    assert_eq!(job.status(), JobStatus::InProgress);
    assert_eq!(job.deliverable(), Some("All tickets answered"));

    lifecycle::start_revision(&job, &mut revisions, &agent_actor).unwrap();
    assert_eq!(revisions[0].status(), RevisionStatus::InProgress);
    assert!(lifecycle::start_revision(&job, &mut revisions, &agent_actor).is_err());

    lifecycle::submit_deliverable(
        &mut job,
        &mut revisions,
        &agent_actor,
        "All tickets answered (#1-#40)".to_string(),
        &world.limits,
    )
    .unwrap();
    assert_eq!(revisions[0].status(), RevisionStatus::Completed);
    assert_eq!(
        revisions[0].revised_deliverable(),
        Some("All tickets answered (#1-#40)")
    );

    let second = lifecycle::request_revision(
        &mut job,
        &mut revisions,
        &world.owner,
        "Sort by priority".to_string(),
        &world.limits,
    )
    .unwrap();
    assert_eq!(second.revision_number, 2);
    assert_eq!(job.payment_status(), PaymentStatus::Escrowed);
}

#[test]
fn test_approve_with_bad_scores_moves_nothing() {
    let mut world = World::with_balance(dec!(100));
    let mut agent = support_agent("careful");
    let (mut job, _) = delivered(&mut world, dec!(100), &mut agent);
    let mut reviews = Vec::new();
    let before = world.ledger.len();

    let err = lifecycle::approve(
        &mut job,
        &mut world.company,
        &mut agent,
        &mut reviews,
        &world.owner,
        ReviewScores::new(6, 5, 5),
        None,
        &mut world.ledger,
    )
    .unwrap_err();

    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert_eq!(job.status(), JobStatus::PendingReview);
    assert_eq!(job.escrow_amount(), dec!(100));
    assert_eq!(agent.pending_payout(), Decimal::ZERO);
    assert!(reviews.is_empty());
    assert_eq!(world.ledger.len(), before);
}

#[test]
fn test_dispute_then_refund() {
    let mut world = World::with_balance(dec!(100));
    let mut agent = support_agent("contested");
    let (mut job, _) = delivered(&mut world, dec!(100), &mut agent);

    lifecycle::dispute(
        &mut job,
        &Actor::Agent(agent.id.clone()),
        "Reviewer unresponsive".to_string(),
        &world.limits,
    )
    .unwrap();
    assert_eq!(job.status(), JobStatus::Disputed);
    assert_eq!(job.payment_status(), PaymentStatus::Escrowed);
    assert_eq!(job.escrow_amount(), dec!(100));

    let err = lifecycle::resolve_dispute(
        &mut job,
        &mut world.company,
        &mut agent,
        &world.owner,
        DisputeDecision::RefundCompany,
        &mut world.ledger,
    )
    .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TRANSITION");

    let tx = lifecycle::resolve_dispute(
        &mut job,
        &mut world.company,
        &mut agent,
        &Actor::Platform,
        DisputeDecision::RefundCompany,
        &mut world.ledger,
    )
    .unwrap();
    assert_eq!(tx.kind, TransactionType::Refund);
    assert_eq!(job.status(), JobStatus::Cancelled);
    assert_eq!(world.company.balance(), dec!(100));
    assert_eq!(agent.reputation.jobs_failed, 1);
    assert!(agent.current_job_id.is_none());
}

#[test]
fn test_dispute_release_completes_job() {
    let mut world = World::with_balance(dec!(100));
    let mut agent = support_agent("vindicated");
    let (mut job, _) = delivered(&mut world, dec!(100), &mut agent);
    lifecycle::dispute(&mut job, &world.owner, "Late".to_string(), &world.limits).unwrap();

    lifecycle::resolve_dispute(
        &mut job,
        &mut world.company,
        &mut agent,
        &Actor::Platform,
        DisputeDecision::ReleaseToAgent,
        &mut world.ledger,
    )
    .unwrap();
    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(agent.pending_payout(), dec!(90));
    assert_eq!(agent.reputation.jobs_completed, 1);
}

#[test]
fn test_cancel_refunds_and_rejects_pending() {
    let mut world = World::with_balance(dec!(100));
    let mut job = world.open(dec!(70));
    let agent = support_agent("waiting");
    let mut applications = Vec::new();
    apply(&world, &job, &mut applications, &agent);

    let refund = lifecycle::cancel(
        &mut job,
        &mut world.company,
        &mut applications,
        &world.owner,
        &mut world.ledger,
    )
    .unwrap();

    assert!(refund.is_some());
    assert_eq!(job.status(), JobStatus::Cancelled);
    assert_eq!(job.payment_status(), PaymentStatus::Refunded);
    assert_eq!(world.company.balance(), dec!(100));
    assert_eq!(applications[0].status(), ApplicationStatus::Rejected);

    let err = lifecycle::cancel(
        &mut job,
        &mut world.company,
        &mut applications,
        &world.owner,
        &mut world.ledger,
    )
    .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TRANSITION");

    let mut draft = world.draft(dec!(10));
    assert!(lifecycle::cancel(&mut draft, &mut world.company, &mut [], &world.owner, &mut world.ledger)
        .unwrap()
        .is_none());
}

#[test]
fn test_cannot_cancel_after_hire() {
    let mut world = World::with_balance(dec!(100));
    let mut agent = support_agent("busy");
    let (mut job, _) = delivered(&mut world, dec!(50), &mut agent);

    let err = lifecycle::cancel(&mut job, &mut world.company, &mut [], &world.owner, &mut world.ledger)
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TRANSITION");
    assert_eq!(job.escrow_amount(), dec!(50));
}

#[test]
fn test_payout_after_completion() {
    let mut world = World::with_balance(dec!(100));
    let mut agent = support_agent("earner");
    let (mut job, _) = delivered(&mut world, dec!(100), &mut agent);
    lifecycle::approve(
        &mut job,
        &mut world.company,
        &mut agent,
        &mut Vec::new(),
        &world.owner,
        ReviewScores::uniform(5),
        None,
        &mut world.ledger,
    )
    .unwrap();

    let err = request_payout(&mut world.ledger, &world.rail, &mut agent, dec!(91)).unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_PAYOUT");

    let tx = request_payout(&mut world.ledger, &world.rail, &mut agent, dec!(90)).unwrap();
    assert_eq!(tx.kind, TransactionType::Payout);
    assert_eq!(agent.pending_payout(), Decimal::ZERO);
    assert_eq!(agent.total_earned(), dec!(90));
}

#[test]
fn test_trust_gate_blocks_new_agents() {
    let mut world = World::with_balance(dec!(100));
    let mut job = Job::new(
        world.company.id.clone(),
        "Sensitive work",
        "",
        JobRequirements::new("research", dec!(60)).with_min_trust_level(TrustLevel::Trusted),
    )
    .unwrap();
    lifecycle::publish(&mut job, &mut world.company, &world.owner, &mut world.ledger).unwrap();

    let newcomer = AgentNode::new("newcomer", Capabilities::default());
    let err = lifecycle::apply(&job, &mut Vec::new(), &newcomer, dec!(50), String::new(), &world.limits)
        .unwrap_err();
    assert!(err.to_string().contains("trust level new below required trusted"));
}

#[test]
fn test_escrow_tracks_budget_through_the_lifecycle() {
    let mut world = World::with_balance(dec!(300));
    let mut agent = support_agent("steady");
    let mut job = world.draft(dec!(100));
    assert_eq!(job.escrow_amount(), Decimal::ZERO);

    lifecycle::publish(&mut job, &mut world.company, &world.owner, &mut world.ledger).unwrap();
    assert_eq!(job.payment_status(), PaymentStatus::Escrowed);
    assert_eq!(job.escrow_amount(), job.budget());
    assert_eq!(job.requirements().budget, dec!(100));

    let mut applications = Vec::new();
    let application = apply(&world, &job, &mut applications, &agent);
    // support above 50 is 4h × 1.2
    assert_eq!(application.estimated_hours, dec!(4.8));
    lifecycle::hire(&mut job, &mut applications, &application.id, &mut agent, &world.owner)
        .unwrap();
    assert_eq!(job.escrow_amount(), job.budget());

    lifecycle::submit_deliverable(
        &mut job,
        &mut Vec::new(),
        &Actor::Agent(agent.id.clone()),
        "done".to_string(),
        &world.limits,
    )
    .unwrap();
    assert_eq!(job.escrow_amount(), job.budget());

    let completion = lifecycle::approve(
        &mut job,
        &mut world.company,
        &mut agent,
        &mut Vec::new(),
        &world.owner,
        ReviewScores::uniform(4),
        None,
        &mut world.ledger,
    )
    .unwrap();
    assert_eq!(job.payment_status(), PaymentStatus::Released);
    assert_eq!(job.escrow_amount(), Decimal::ZERO);
    assert_eq!(completion.transaction.gross_amount, job.budget());
}
