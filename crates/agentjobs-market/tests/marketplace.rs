use std::sync::Arc;

use agentjobs_core::{AgentNode, Company, ReviewScores, SimulatedRail};
use agentjobs_market::{DisputeDecision, MarketConfig, Marketplace, PaymentMode};
use agentjobs_types::{
    Actor, AgentId, AgentStatus, ApplicationStatus, Capabilities, CompanyId, JobId,
    JobRequirements, JobStatus, MarketError, MessageKind, PaymentStatus, TransactionType,
};
use rust_decimal_macros::dec;

fn market() -> Marketplace {
    Marketplace::new(&MarketConfig::default()).unwrap()
}

fn funded_company(market: &Marketplace, name: &str, amount: rust_decimal::Decimal) -> CompanyId {
    let id = market.register_company(Company::new(name));
    market.add_funds(&id, amount).unwrap();
    id
}

fn online_agent(market: &Marketplace, name: &str, caps: Capabilities) -> AgentId {
    let id = market.register_agent(AgentNode::new(name, caps));
    market.heartbeat(&id, AgentStatus::Online).unwrap();
    id
}

fn support_caps() -> Capabilities {
    Capabilities::new()
        .with_context_window(32_000)
        .with_tools(["email", "crm"])
        .with_specializations(["support"])
        .with_accuracy("support", 0.9)
        .with_throughput("support", 30.0)
}

fn open_job(market: &Marketplace, company: &CompanyId, budget: rust_decimal::Decimal) -> JobId {
    let owner = Actor::Company(company.clone());
    let job = market
        .create_job(
            &owner,
            "Answer tickets",
            "Clear the support queue",
            JobRequirements::new("support", budget).with_required_tools(["email"]),
        )
        .unwrap();
    market.publish_job(&owner, &job).unwrap();
    job
}

#[test]
fn test_full_flow_through_the_service() {
    let market = market();
    let company = funded_company(&market, "Acme", dec!(500));
    let owner = Actor::Company(company.clone());
    let agent = online_agent(&market, "helper", support_caps());
    let worker = Actor::Agent(agent.clone());

    let job = open_job(&market, &company, dec!(100));
    assert_eq!(market.company(&company).unwrap().balance(), dec!(400));
    assert_eq!(market.company(&company).unwrap().jobs_posted, 1);

    let application = market.apply(&agent, &job, dec!(90), "on it").unwrap();
    market.hire(&owner, &job, &application.id).unwrap();
    assert_eq!(market.agent(&agent).unwrap().node.status, AgentStatus::Busy);

    market.submit_deliverable(&worker, &job, "all tickets answered").unwrap();
    let completion = market
        .approve(&owner, &job, ReviewScores::new(5, 4, 3), Some("good".into()))
        .unwrap();
    assert_eq!(completion.transaction.fee_amount, dec!(10));
    assert_eq!(completion.transaction.net_amount, dec!(90));

    let record = market.job(&job).unwrap();
    assert_eq!(record.job.status(), JobStatus::Completed);
    assert_eq!(record.job.payment_status(), PaymentStatus::Released);
    assert_eq!(record.review, Some(completion.review.clone()));
    assert_eq!(
        record.accepted_application().map(|a| a.id.clone()),
        Some(application.id)
    );

    let agent_record = market.agent(&agent).unwrap();
    assert_eq!(agent_record.reviews.len(), 1);
    assert_eq!(agent_record.node.pending_payout(), dec!(90));
    assert_eq!(agent_record.node.status, AgentStatus::Online);
    assert_eq!(market.platform_revenue(), dec!(10));

    let payout = market.request_payout(&agent, dec!(50)).unwrap();
    assert_eq!(payout.kind, TransactionType::Payout);
    assert_eq!(market.agent(&agent).unwrap().node.pending_payout(), dec!(40));

    let summary = market.reputation_summary(&agent).unwrap();
    assert_eq!(summary.jobs_completed, 1);
    assert!(market.funds_snapshot().reconciles());
}

#[test]
fn test_unknown_ids_are_not_found() {
    let market = market();
    let err = market.add_funds(&CompanyId::new(), dec!(10)).unwrap_err();
    assert!(matches!(err, MarketError::NotFound { .. }));

    let err = market
        .publish_job(&Actor::Platform, &JobId::new())
        .unwrap_err();
    assert!(matches!(err, MarketError::NotFound { .. }));

    let err = market.recommend_jobs(&AgentId::new(), 5).unwrap_err();
    assert!(matches!(err, MarketError::NotFound { .. }));
}

#[test]
fn test_only_companies_create_jobs() {
    let market = market();
    let err = market
        .create_job(
            &Actor::Agent(AgentId::new()),
            "Sneaky",
            "",
            JobRequirements::new("support", dec!(10)),
        )
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput { .. }));
}

#[test]
fn test_publish_without_funds_keeps_draft() {
    let market = market();
    let company = funded_company(&market, "Thin", dec!(50));
    let owner = Actor::Company(company.clone());
    let job = market
        .create_job(&owner, "Big job", "", JobRequirements::new("support", dec!(80)))
        .unwrap();

    let err = market.publish_job(&owner, &job).unwrap_err();
    assert!(matches!(err, MarketError::InsufficientFunds { .. }));
    assert_eq!(market.job(&job).unwrap().job.status(), JobStatus::Draft);
    assert_eq!(market.company(&company).unwrap().balance(), dec!(50));
    assert_eq!(market.transactions().len(), 1);
}

#[test]
fn test_withdraw_through_application_index() {
    let market = market();
    let company = funded_company(&market, "Acme", dec!(100));
    let agent = online_agent(&market, "helper", support_caps());
    let job = open_job(&market, &company, dec!(60));

    let application = market.apply(&agent, &job, dec!(60), "").unwrap();
    let err = market
        .withdraw_application(&Actor::Company(company.clone()), &application.id)
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidTransition { .. }));

    market
        .withdraw_application(&Actor::Agent(agent.clone()), &application.id)
        .unwrap();
    let record = market.job(&job).unwrap();
    assert_eq!(record.applications[0].status(), ApplicationStatus::Withdrawn);
    assert_eq!(record.active_applications(), 0);
}

#[test]
fn test_revision_and_dispute_through_the_service() {
    let market = market();
    let company = funded_company(&market, "Acme", dec!(200));
    let owner = Actor::Company(company.clone());
    let agent = online_agent(&market, "helper", support_caps());
    let worker = Actor::Agent(agent.clone());
    let job = open_job(&market, &company, dec!(100));

    let application = market.apply(&agent, &job, dec!(100), "").unwrap();
    market.hire(&owner, &job, &application.id).unwrap();
    market.submit_deliverable(&worker, &job, "draft one").unwrap();

    let revision = market
        .request_revision(&owner, &job, "tone is off")
        .unwrap();
    assert_eq!(revision.revision_number, 1);
    market.start_revision(&worker, &job).unwrap();
    market.submit_deliverable(&worker, &job, "draft two").unwrap();

    market.dispute(&worker, &job, "scope keeps growing").unwrap();
    let err = market
        .resolve_dispute(&owner, &job, DisputeDecision::RefundCompany)
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidTransition { .. }));

    let refund = market
        .resolve_dispute(&Actor::Platform, &job, DisputeDecision::RefundCompany)
        .unwrap();
    assert_eq!(refund.kind, TransactionType::Refund);
    assert_eq!(market.company(&company).unwrap().balance(), dec!(200));
    assert_eq!(market.job(&job).unwrap().job.status(), JobStatus::Cancelled);
    assert!(!market.agent(&agent).unwrap().node.is_busy());
    assert!(market.funds_snapshot().reconciles());
}

#[test]
fn test_messages_between_owner_and_hired_agent() {
    let market = market();
    let company = funded_company(&market, "Acme", dec!(500));
    let owner = Actor::Company(company.clone());
    let agent = online_agent(&market, "helper", support_caps());
    let worker = Actor::Agent(agent.clone());
    let rival = Actor::Agent(online_agent(&market, "rival", support_caps()));

    let job = open_job(&market, &company, dec!(100));
    let err = market
        .send_message(&owner, &job, MessageKind::Text, "anyone there?")
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TRANSITION");

    let application = market.apply(&agent, &job, dec!(90), "on it").unwrap();
    market.hire(&owner, &job, &application.id).unwrap();

    market
        .send_message(&owner, &job, MessageKind::Instruction, "refunds first")
        .unwrap();
    assert!(market
        .send_message(&rival, &job, MessageKind::Text, "pick me")
        .is_err());
    assert_eq!(market.unread_messages(&worker, &job).unwrap().len(), 1);

    market.submit_deliverable(&worker, &job, "done").unwrap();
    market
        .send_message(&worker, &job, MessageKind::Text, "ready for review")
        .unwrap();

    let thread = market.read_messages(&worker, &job).unwrap();
    assert_eq!(thread.len(), 2);
    assert!(market.unread_messages(&worker, &job).unwrap().is_empty());
    assert_eq!(market.unread_messages(&owner, &job).unwrap().len(), 1);
    assert_eq!(market.job(&job).unwrap().messages.len(), 2);
}

#[test]
fn test_cancel_open_job_refunds() {
    let market = market();
    let company = funded_company(&market, "Acme", dec!(100));
    let owner = Actor::Company(company.clone());
    let job = open_job(&market, &company, dec!(70));

    let refund = market.cancel_job(&owner, &job).unwrap();
    assert_eq!(refund.map(|tx| tx.gross_amount), Some(dec!(70)));
    assert_eq!(market.company(&company).unwrap().balance(), dec!(100));
    assert!(market.jobs_with_status(JobStatus::Open).is_empty());
    assert_eq!(market.jobs_with_status(JobStatus::Cancelled).len(), 1);
}

#[test]
fn test_recommend_agents_skips_offline_and_disqualified() {
    let market = market();
    let company = funded_company(&market, "Acme", dec!(100));
    let job = open_job(&market, &company, dec!(50));

    let strong = online_agent(&market, "strong", support_caps());
    let weak = online_agent(
        &market,
        "weak",
        Capabilities::new().with_context_window(8_000).with_tools(["email"]),
    );
    let _no_email = online_agent(
        &market,
        "no-email",
        Capabilities::new().with_tools(["crm"]),
    );
    let _offline = market.register_agent(AgentNode::new("asleep", support_caps()));

    let ranked = market.recommend_agents(&job, 10).unwrap();
    let ids: Vec<AgentId> = ranked.iter().map(|r| r.agent.id.clone()).collect();
    assert_eq!(ids, vec![strong, weak]);
    assert!(ranked[0].score.value > ranked[1].score.value);

    assert_eq!(market.recommend_agents(&job, 1).unwrap().len(), 1);
}

#[test]
fn test_recommend_jobs_skips_applied_and_closed() {
    let market = market();
    let company = funded_company(&market, "Acme", dec!(300));
    let owner = Actor::Company(company.clone());
    let agent = online_agent(&market, "helper", support_caps());

    let applied = open_job(&market, &company, dec!(50));
    let open = open_job(&market, &company, dec!(60));
    let cancelled = open_job(&market, &company, dec!(70));
    market.cancel_job(&owner, &cancelled).unwrap();
    market.apply(&agent, &applied, dec!(50), "").unwrap();

    let ranked = market.recommend_jobs(&agent, 10).unwrap();
    let ids: Vec<JobId> = ranked.iter().map(|r| r.listing.id.clone()).collect();
    assert_eq!(ids, vec![open]);
}

#[test]
fn test_external_mode_needs_a_rail() {
    let mut config = MarketConfig::default();
    config.payments.mode = PaymentMode::External;
    assert!(Marketplace::new(&config).is_err());
    assert!(Marketplace::with_rail(&config, Arc::new(SimulatedRail::new())).is_ok());
}

#[test]
fn test_refused_payout_leaves_balance() {
    let rail = Arc::new(SimulatedRail::new());
    let market = Marketplace::with_rail(&MarketConfig::default(), rail.clone()).unwrap();
    let company = funded_company(&market, "Acme", dec!(100));
    let owner = Actor::Company(company.clone());
    let agent = online_agent(&market, "helper", support_caps());
    let job = open_job(&market, &company, dec!(100));

    let application = market.apply(&agent, &job, dec!(100), "").unwrap();
    market.hire(&owner, &job, &application.id).unwrap();
    market
        .submit_deliverable(&Actor::Agent(agent.clone()), &job, "done")
        .unwrap();
    market
        .approve(&owner, &job, ReviewScores::uniform(5), None)
        .unwrap();

    rail.set_refuse_payouts(true);
    let err = market.request_payout(&agent, dec!(10)).unwrap_err();
    assert!(matches!(err, MarketError::PaymentRail { .. }));
    assert_eq!(market.agent(&agent).unwrap().node.pending_payout(), dec!(90));
}
