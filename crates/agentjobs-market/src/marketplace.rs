//! The marketplace service
//!
//! Owns every record and serialises same-entity operations. Each company,
//! job and agent sits behind its own `parking_lot::Mutex` inside a `DashMap`
//! index; the payment ledger has one mutex of its own.
//!
//! # Lock order
//!
//! company → job → agent → ledger
//!
//! Every operation takes the locks it needs in that order and never holds a
//! `DashMap` reference while locking a record, so operations on different
//! entities run in parallel and no two operations can deadlock. Two `hire`
//! calls on one job serialise on the job lock; the second sees IN_PROGRESS
//! and fails.

use std::sync::Arc;

use agentjobs_core::lifecycle::{self, Completion, DisputeDecision, TextLimits};
use agentjobs_core::messaging;
use agentjobs_core::payout;
use agentjobs_core::reputation::{self, ReputationSummary};
use agentjobs_core::{
    AgentNode, Application, Company, EscrowLedger, Job, Message, PaymentMode, PaymentRail,
    PaymentTransaction, ReviewScores, Revision, SimulatedRail,
};
use agentjobs_matching::{rank_agents_for_job, rank_jobs_for_agent, RankedAgent, RankedJob};
use agentjobs_types::{
    Actor, AgentId, AgentStatus, ApplicationId, CompanyId, Decimal, JobAction, JobId,
    JobRequirements, JobStatus, MarketError, MessageKind, Result, TransactionType,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::MarketConfig;
use crate::records::{AgentRecord, JobRecord};

type Shared<T> = Arc<Mutex<T>>;

/// Run an operation, logging it if the business rules reject it
fn logged<T>(operation: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let result = f();
    if let Err(err) = &result {
        tracing::warn!(operation, code = err.error_code(), error = %err, "operation rejected");
    }
    result
}

/// Totals across every money pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundsSnapshot {
    pub company_balances: Decimal,
    pub escrowed: Decimal,
    pub pending_payouts: Decimal,
    pub platform_revenue: Decimal,
    pub deposited: Decimal,
    pub paid_out: Decimal,
}

impl FundsSnapshot {
    /// Money in equals money held plus money out
    pub fn reconciles(&self) -> bool {
        self.deposited - self.paid_out
            == self.company_balances + self.escrowed + self.pending_payouts + self.platform_revenue
    }
}

/// In-memory agent job marketplace
pub struct Marketplace {
    limits: TextLimits,
    rail: Arc<dyn PaymentRail>,
    companies: DashMap<CompanyId, Shared<Company>>,
    agents: DashMap<AgentId, Shared<AgentRecord>>,
    jobs: DashMap<JobId, Shared<JobRecord>>,
    application_jobs: DashMap<ApplicationId, JobId>,
    ledger: Mutex<EscrowLedger>,
}

impl Marketplace {
    /// Build a marketplace on the configured rail
    pub fn new(config: &MarketConfig) -> Result<Self> {
        match config.payments.mode {
            PaymentMode::Simulated => Self::with_rail(config, Arc::new(SimulatedRail::new())),
            PaymentMode::External => Err(MarketError::invalid_input(
                "payments.mode",
                "external payments need a rail supplied through Marketplace::with_rail",
            )),
        }
    }

    pub fn with_rail(config: &MarketConfig, rail: Arc<dyn PaymentRail>) -> Result<Self> {
        config.validate()?;
        let fees = config.fee_policy()?;
        tracing::info!(
            fee_percent = %fees.percent(),
            rail = rail.name(),
            "marketplace initialised"
        );
        Ok(Self {
            limits: config.text_limits(),
            rail,
            companies: DashMap::new(),
            agents: DashMap::new(),
            jobs: DashMap::new(),
            application_jobs: DashMap::new(),
            ledger: Mutex::new(EscrowLedger::new(fees)),
        })
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    fn company_entry(&self, id: &CompanyId) -> Result<Shared<Company>> {
        self.companies
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| MarketError::not_found("Company", id))
    }

    fn agent_entry(&self, id: &AgentId) -> Result<Shared<AgentRecord>> {
        self.agents
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| MarketError::not_found("Agent", id))
    }

    fn job_entry(&self, id: &JobId) -> Result<Shared<JobRecord>> {
        self.jobs
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| MarketError::not_found("Job", id))
    }

    /// Owner of a job. Ownership never changes, so this is read ahead of
    /// taking the company lock.
    fn owner_of(&self, job: &Shared<JobRecord>) -> Result<Shared<Company>> {
        let company_id = job.lock().job.company_id.clone();
        self.company_entry(&company_id)
    }

    fn hired_agent(&self, record: &JobRecord, action: JobAction) -> Result<Shared<AgentRecord>> {
        let agent_id = record.job.hired_agent_id().ok_or_else(|| {
            MarketError::invalid_transition(
                &record.job.id,
                record.job.status(),
                action,
                "no agent is hired on this job",
            )
        })?;
        self.agent_entry(agent_id)
    }

    // ========================================================================
    // Registration and funding
    // ========================================================================

    pub fn register_company(&self, company: Company) -> CompanyId {
        let id = company.id.clone();
        tracing::info!(company_id = %id, name = %company.name, "company registered");
        self.companies.insert(id.clone(), Arc::new(Mutex::new(company)));
        id
    }

    pub fn register_agent(&self, node: AgentNode) -> AgentId {
        let id = node.id.clone();
        tracing::info!(agent_id = %id, name = %node.name, "agent registered");
        self.agents
            .insert(id.clone(), Arc::new(Mutex::new(AgentRecord::new(node))));
        id
    }

    /// Top up a company balance through the payment rail
    pub fn add_funds(&self, company_id: &CompanyId, amount: Decimal) -> Result<PaymentTransaction> {
        logged("add_funds", || {
            let company = self.company_entry(company_id)?;
            let mut company = company.lock();
            let mut ledger = self.ledger.lock();
            payout::add_funds(&mut ledger, self.rail.as_ref(), &mut company, amount)
        })
    }

    /// Pay out part of an agent's pending balance through the payment rail
    pub fn request_payout(&self, agent_id: &AgentId, amount: Decimal) -> Result<PaymentTransaction> {
        logged("request_payout", || {
            let agent = self.agent_entry(agent_id)?;
            let mut agent = agent.lock();
            let mut ledger = self.ledger.lock();
            payout::request_payout(&mut ledger, self.rail.as_ref(), &mut agent.node, amount)
        })
    }

    pub fn heartbeat(&self, agent_id: &AgentId, status: AgentStatus) -> Result<()> {
        logged("heartbeat", || {
            let agent = self.agent_entry(agent_id)?;
            let mut agent = agent.lock();
            agent.node.heartbeat(status)
        })
    }

    // ========================================================================
    // Posting
    // ========================================================================

    /// Create a DRAFT job owned by the acting company
    pub fn create_job(
        &self,
        actor: &Actor,
        title: impl Into<String>,
        description: impl Into<String>,
        requirements: JobRequirements,
    ) -> Result<JobId> {
        logged("create_job", || {
            let company_id = match actor {
                Actor::Company(id) => id,
                other => {
                    return Err(MarketError::invalid_input(
                        "actor",
                        format!("only companies post jobs, not {}", other),
                    ))
                }
            };
            let company = self.company_entry(company_id)?;
            let job = Job::new(company_id.clone(), title, description, requirements)?;
            let id = job.id.clone();
            company.lock().jobs_posted += 1;

            tracing::info!(job_id = %id, company_id = %company_id, budget = %job.budget(), "job drafted");
            self.jobs.insert(id.clone(), Arc::new(Mutex::new(JobRecord::new(job))));
            Ok(id)
        })
    }

    /// DRAFT → OPEN, escrowing the budget
    pub fn publish_job(&self, actor: &Actor, job_id: &JobId) -> Result<PaymentTransaction> {
        logged("publish_job", || {
            let job = self.job_entry(job_id)?;
            let company = self.owner_of(&job)?;

            let mut company = company.lock();
            let mut record = job.lock();
            let mut ledger = self.ledger.lock();
            lifecycle::publish(&mut record.job, &mut company, actor, &mut ledger)
        })
    }

    /// DRAFT/OPEN → CANCELLED, refunding any escrow
    pub fn cancel_job(&self, actor: &Actor, job_id: &JobId) -> Result<Option<PaymentTransaction>> {
        logged("cancel_job", || {
            let job = self.job_entry(job_id)?;
            let company = self.owner_of(&job)?;

            let mut company = company.lock();
            let mut guard = job.lock();
            let record = &mut *guard;
            let mut ledger = self.ledger.lock();
            lifecycle::cancel(
                &mut record.job,
                &mut company,
                &mut record.applications,
                actor,
                &mut ledger,
            )
        })
    }

    // ========================================================================
    // Applications and hiring
    // ========================================================================

    pub fn apply(
        &self,
        agent_id: &AgentId,
        job_id: &JobId,
        bid_amount: Decimal,
        cover_letter: impl Into<String>,
    ) -> Result<Application> {
        logged("apply", || {
            let job = self.job_entry(job_id)?;
            let agent = self.agent_entry(agent_id)?;

            let mut guard = job.lock();
            let record = &mut *guard;
            let agent = agent.lock();
            let application = lifecycle::apply(
                &record.job,
                &mut record.applications,
                &agent.node,
                bid_amount,
                cover_letter.into(),
                &self.limits,
            )?;
            self.application_jobs
                .insert(application.id.clone(), job_id.clone());
            Ok(application)
        })
    }

    pub fn withdraw_application(&self, actor: &Actor, application_id: &ApplicationId) -> Result<()> {
        logged("withdraw_application", || {
            let job_id = self
                .application_jobs
                .get(application_id)
                .map(|entry| entry.value().clone())
                .ok_or_else(|| MarketError::not_found("Application", application_id))?;
            let job = self.job_entry(&job_id)?;

            let mut guard = job.lock();
            let record = &mut *guard;
            lifecycle::withdraw_application(
                &record.job,
                &mut record.applications,
                application_id,
                actor,
            )
        })
    }

    /// OPEN → IN_PROGRESS with the agent behind `application_id`
    pub fn hire(&self, actor: &Actor, job_id: &JobId, application_id: &ApplicationId) -> Result<()> {
        logged("hire", || {
            let job = self.job_entry(job_id)?;

            let mut guard = job.lock();
            let record = &mut *guard;
            let agent_id = record
                .applications
                .iter()
                .find(|a| &a.id == application_id)
                .map(|a| a.agent_id.clone())
                .ok_or_else(|| MarketError::not_found("Application", application_id))?;
            let agent = self.agent_entry(&agent_id)?;
            let mut agent = agent.lock();

            lifecycle::hire(
                &mut record.job,
                &mut record.applications,
                application_id,
                &mut agent.node,
                actor,
            )
        })
    }

    // ========================================================================
    // Delivery and review
    // ========================================================================

    pub fn submit_deliverable(
        &self,
        actor: &Actor,
        job_id: &JobId,
        deliverable: impl Into<String>,
    ) -> Result<()> {
        logged("submit_deliverable", || {
            let job = self.job_entry(job_id)?;
            let mut guard = job.lock();
            let record = &mut *guard;
            lifecycle::submit_deliverable(
                &mut record.job,
                &mut record.revisions,
                actor,
                deliverable.into(),
                &self.limits,
            )
        })
    }

    /// PENDING_REVIEW → COMPLETED, releasing escrow to the hired agent
    pub fn approve(
        &self,
        actor: &Actor,
        job_id: &JobId,
        scores: ReviewScores,
        comment: Option<String>,
    ) -> Result<Completion> {
        logged("approve", || {
            let job = self.job_entry(job_id)?;
            let company = self.owner_of(&job)?;

            let mut company = company.lock();
            let mut guard = job.lock();
            let record = &mut *guard;
            let agent = self.hired_agent(record, JobAction::Approve)?;
            let mut agent_guard = agent.lock();
            let agent = &mut *agent_guard;
            let mut ledger = self.ledger.lock();

            let completion = lifecycle::approve(
                &mut record.job,
                &mut company,
                &mut agent.node,
                &mut agent.reviews,
                actor,
                scores,
                comment,
                &mut ledger,
            )?;
            record.review = Some(completion.review.clone());
            Ok(completion)
        })
    }

    pub fn request_revision(
        &self,
        actor: &Actor,
        job_id: &JobId,
        request_text: impl Into<String>,
    ) -> Result<Revision> {
        logged("request_revision", || {
            let job = self.job_entry(job_id)?;
            let mut guard = job.lock();
            let record = &mut *guard;
            lifecycle::request_revision(
                &mut record.job,
                &mut record.revisions,
                actor,
                request_text.into(),
                &self.limits,
            )
        })
    }

    pub fn start_revision(&self, actor: &Actor, job_id: &JobId) -> Result<()> {
        logged("start_revision", || {
            let job = self.job_entry(job_id)?;
            let mut guard = job.lock();
            let record = &mut *guard;
            lifecycle::start_revision(&record.job, &mut record.revisions, actor)
        })
    }

    // ========================================================================
    // Messaging
    // ========================================================================

    pub fn send_message(
        &self,
        actor: &Actor,
        job_id: &JobId,
        kind: MessageKind,
        content: impl Into<String>,
    ) -> Result<Message> {
        logged("send_message", || {
            let job = self.job_entry(job_id)?;
            let mut guard = job.lock();
            let record = &mut *guard;
            messaging::send_message(
                &record.job,
                &mut record.messages,
                actor,
                kind,
                content.into(),
                &self.limits,
            )
        })
    }

    /// The job's thread, marked read for the caller
    pub fn read_messages(&self, actor: &Actor, job_id: &JobId) -> Result<Vec<Message>> {
        logged("read_messages", || {
            let job = self.job_entry(job_id)?;
            let mut guard = job.lock();
            let record = &mut *guard;
            messaging::read_messages(&record.job, &mut record.messages, actor)
        })
    }

    pub fn unread_messages(&self, actor: &Actor, job_id: &JobId) -> Result<Vec<Message>> {
        logged("unread_messages", || {
            let job = self.job_entry(job_id)?;
            let record = job.lock();
            messaging::unread_messages(&record.job, &record.messages, actor)
        })
    }

    // ========================================================================
    // Disputes
    // ========================================================================

    pub fn dispute(&self, actor: &Actor, job_id: &JobId, reason: impl Into<String>) -> Result<()> {
        logged("dispute", || {
            let job = self.job_entry(job_id)?;
            let mut record = job.lock();
            lifecycle::dispute(&mut record.job, actor, reason.into(), &self.limits)
        })
    }

    pub fn resolve_dispute(
        &self,
        actor: &Actor,
        job_id: &JobId,
        decision: DisputeDecision,
    ) -> Result<PaymentTransaction> {
        logged("resolve_dispute", || {
            let job = self.job_entry(job_id)?;
            let company = self.owner_of(&job)?;

            let mut company = company.lock();
            let mut record = job.lock();
            let agent = self.hired_agent(&record, JobAction::ResolveDispute)?;
            let mut agent = agent.lock();
            let mut ledger = self.ledger.lock();
            lifecycle::resolve_dispute(
                &mut record.job,
                &mut company,
                &mut agent.node,
                actor,
                decision,
                &mut ledger,
            )
        })
    }

    // ========================================================================
    // Ranking
    // ========================================================================

    /// Feasible agents for a job, best first. Offline agents are skipped.
    pub fn recommend_agents(&self, job_id: &JobId, limit: usize) -> Result<Vec<RankedAgent<AgentNode>>> {
        let job = self.job_entry(job_id)?.lock().job.clone();

        let entries: Vec<Shared<AgentRecord>> =
            self.agents.iter().map(|e| Arc::clone(e.value())).collect();
        let candidates = entries.iter().filter_map(|entry| {
            let record = entry.lock();
            (record.node.status != AgentStatus::Offline).then(|| record.node.clone())
        });

        let mut ranked = rank_agents_for_job(candidates, &job);
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Open jobs for an agent, best first, excluding jobs it already
    /// applied to
    pub fn recommend_jobs(&self, agent_id: &AgentId, limit: usize) -> Result<Vec<RankedJob<Job>>> {
        let agent = self.agent_entry(agent_id)?.lock().node.clone();

        let entries: Vec<Shared<JobRecord>> =
            self.jobs.iter().map(|e| Arc::clone(e.value())).collect();
        let listings = entries.iter().filter_map(|entry| {
            let record = entry.lock();
            let applied = record
                .applications
                .iter()
                .any(|a| &a.agent_id == agent_id && a.status().is_active());
            (record.job.status() == JobStatus::Open && !applied)
                .then(|| (record.job.clone(), record.active_applications()))
        });

        let mut ranked = rank_jobs_for_agent(&agent, listings);
        ranked.truncate(limit);
        Ok(ranked)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn company(&self, id: &CompanyId) -> Result<Company> {
        Ok(self.company_entry(id)?.lock().clone())
    }

    pub fn agent(&self, id: &AgentId) -> Result<AgentRecord> {
        Ok(self.agent_entry(id)?.lock().clone())
    }

    pub fn job(&self, id: &JobId) -> Result<JobRecord> {
        Ok(self.job_entry(id)?.lock().clone())
    }

    pub fn jobs_with_status(&self, status: JobStatus) -> Vec<Job> {
        let entries: Vec<Shared<JobRecord>> =
            self.jobs.iter().map(|e| Arc::clone(e.value())).collect();
        let mut jobs: Vec<Job> = entries
            .iter()
            .filter_map(|entry| {
                let record = entry.lock();
                (record.job.status() == status).then(|| record.job.clone())
            })
            .collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        jobs
    }

    pub fn reputation_summary(&self, agent_id: &AgentId) -> Result<ReputationSummary> {
        Ok(reputation::summarize(&self.agent_entry(agent_id)?.lock().node))
    }

    /// Copy of the payment ledger, oldest first
    pub fn transactions(&self) -> Vec<PaymentTransaction> {
        self.ledger.lock().transactions().to_vec()
    }

    pub fn platform_revenue(&self) -> Decimal {
        self.ledger.lock().platform_revenue()
    }

    /// Totals across all pools. Exact only while no operation is running.
    pub fn funds_snapshot(&self) -> FundsSnapshot {
        let companies: Vec<Shared<Company>> =
            self.companies.iter().map(|e| Arc::clone(e.value())).collect();
        let jobs: Vec<Shared<JobRecord>> =
            self.jobs.iter().map(|e| Arc::clone(e.value())).collect();
        let agents: Vec<Shared<AgentRecord>> =
            self.agents.iter().map(|e| Arc::clone(e.value())).collect();

        let company_balances: Decimal = companies.iter().map(|c| c.lock().balance()).sum();
        let escrowed: Decimal = jobs.iter().map(|j| j.lock().job.escrow_amount()).sum();
        let pending_payouts: Decimal = agents.iter().map(|a| a.lock().node.pending_payout()).sum();

        let ledger = self.ledger.lock();
        FundsSnapshot {
            company_balances,
            escrowed,
            pending_payouts,
            platform_revenue: ledger.platform_revenue(),
            deposited: ledger.total_of(TransactionType::Deposit),
            paid_out: ledger.total_of(TransactionType::Payout),
        }
    }
}
