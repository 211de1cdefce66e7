//! Seeded end-to-end marketplace run
//!
//! Companies post jobs, the ranking engine proposes agents, agents bid in
//! parallel, the best bidder is hired, delivers and gets reviewed. Every
//! few jobs the company asks for a revision first. The seed rotates which
//! job templates each company posts, so runs are reproducible.

use std::sync::Arc;

use agentjobs_core::{AgentNode, Application, Company, ReviewScores};
use agentjobs_market::{FundsSnapshot, Marketplace};
use agentjobs_matching::{estimate_job_hours, MatchQuality};
use agentjobs_types::{
    Actor, AgentId, AgentStatus, Capabilities, CompanyId, Decimal, JobId, JobRequirements,
    MarketError, TrustLevel,
};
use anyhow::Context;
use rust_decimal_macros::dec;

use crate::display;

struct AgentTemplate {
    name: &'static str,
    tools: &'static [&'static str],
    context_window: u32,
    specializations: &'static [(&'static str, f64, f64)],
    hourly_rate: Decimal,
}

struct JobTemplate {
    title: &'static str,
    category: &'static str,
    tools: &'static [&'static str],
    min_context: u32,
    min_trust: TrustLevel,
    budget: Decimal,
}

const COMPANIES: [&str; 3] = ["Northwind", "Globex", "Initech"];
const COMPANY_FUNDING: Decimal = dec!(2500);

const AGENTS: [AgentTemplate; 5] = [
    AgentTemplate {
        name: "ticket-tamer",
        tools: &["email", "crm"],
        context_window: 32_000,
        specializations: &[("support", 0.92, 40.0)],
        hourly_rate: dec!(12),
    },
    AgentTemplate {
        name: "deep-reader",
        tools: &["web_search", "browser"],
        context_window: 200_000,
        specializations: &[("research", 0.95, 6.0), ("analysis", 0.9, 5.0)],
        hourly_rate: dec!(25),
    },
    AgentTemplate {
        name: "wordsmith",
        tools: &["web_search"],
        context_window: 64_000,
        specializations: &[("content", 0.88, 3.0)],
        hourly_rate: dec!(15),
    },
    AgentTemplate {
        name: "query-pilot",
        tools: &["sql", "code_exec"],
        context_window: 128_000,
        specializations: &[("data", 0.97, 20.0), ("code", 0.85, 2.0), ("analysis", 0.8, 4.0)],
        hourly_rate: dec!(30),
    },
    AgentTemplate {
        name: "generalist",
        tools: &["email", "web_search", "sql"],
        context_window: 16_000,
        specializations: &[],
        hourly_rate: dec!(8),
    },
];

const JOBS: [JobTemplate; 6] = [
    JobTemplate {
        title: "Clear the support backlog",
        category: "support",
        tools: &["email"],
        min_context: 8_000,
        min_trust: TrustLevel::New,
        budget: dec!(60),
    },
    JobTemplate {
        title: "Competitor landscape brief",
        category: "research",
        tools: &["web_search"],
        min_context: 100_000,
        min_trust: TrustLevel::New,
        budget: dec!(220),
    },
    JobTemplate {
        title: "Launch blog post",
        category: "content",
        tools: &[],
        min_context: 0,
        min_trust: TrustLevel::New,
        budget: dec!(90),
    },
    JobTemplate {
        title: "Churn cohort extract",
        category: "data",
        tools: &["sql"],
        min_context: 32_000,
        min_trust: TrustLevel::New,
        budget: dec!(150),
    },
    JobTemplate {
        title: "Quarterly metrics review",
        category: "analysis",
        tools: &[],
        min_context: 64_000,
        min_trust: TrustLevel::New,
        budget: dec!(180),
    },
    JobTemplate {
        title: "Escalations for key accounts",
        category: "support",
        tools: &["email", "crm"],
        min_context: 16_000,
        min_trust: TrustLevel::Verified,
        budget: dec!(120),
    },
];

/// How many recommended agents are invited to bid on each job
const SHORTLIST: usize = 3;

/// Outcome of a run
pub struct Report {
    pub completed: usize,
    pub unfilled: usize,
    pub snapshot: FundsSnapshot,
}

pub async fn run(market: Arc<Marketplace>, seed: u64, rounds: usize) -> anyhow::Result<Report> {
    display::heading("Registering participants");
    let companies = register_companies(&market)?;
    let agents = register_agents(&market)?;

    let mut completed = 0;
    let mut unfilled = 0;
    for round in 0..rounds {
        display::heading(&format!("Round {}", round + 1));
        for (index, company) in companies.iter().enumerate() {
            let slot = (seed as usize + round * companies.len() + index) % JOBS.len();
            let Some(job) = post(&market, company, &JOBS[slot])? else {
                continue;
            };
            let revise = (seed as usize + round + index) % 4 == 0;
            if fill(&market, company, &job, revise).await? {
                completed += 1;
            } else {
                unfilled += 1;
                market.cancel_job(&Actor::Company(company.clone()), &job)?;
                display::skipped(&format!("{}: no eligible bids, job cancelled", JOBS[slot].title));
            }
        }
    }

    display::heading("Payouts");
    for agent_id in &agents {
        let record = market.agent(agent_id)?;
        let pending = record.node.pending_payout();
        if pending > Decimal::ZERO {
            market.request_payout(agent_id, pending)?;
            display::done(&format!("{} paid out {}", record.node.name, display::money(pending)));
        }
    }

    print_reputation(&market, &agents)?;

    Ok(Report {
        completed,
        unfilled,
        snapshot: market.funds_snapshot(),
    })
}

fn register_companies(market: &Marketplace) -> anyhow::Result<Vec<CompanyId>> {
    let mut ids = Vec::with_capacity(COMPANIES.len());
    for name in COMPANIES {
        let id = market.register_company(Company::new(name));
        market.add_funds(&id, COMPANY_FUNDING)?;
        display::done(&format!("{} funded with {}", name, display::money(COMPANY_FUNDING)));
        ids.push(id);
    }
    Ok(ids)
}

fn register_agents(market: &Marketplace) -> anyhow::Result<Vec<AgentId>> {
    let mut ids = Vec::with_capacity(AGENTS.len());
    for template in &AGENTS {
        let mut caps = Capabilities::new()
            .with_context_window(template.context_window)
            .with_tools(template.tools.iter().copied())
            .with_specializations(template.specializations.iter().map(|(c, _, _)| *c));
        for (category, accuracy, throughput) in template.specializations {
            caps = caps
                .with_accuracy(*category, *accuracy)
                .with_throughput(*category, *throughput);
        }
        let node = AgentNode::new(template.name, caps).with_hourly_rate(template.hourly_rate);
        let id = market.register_agent(node);
        market.heartbeat(&id, AgentStatus::Online)?;
        display::done(&format!(
            "{} online at {}/h",
            template.name,
            display::money(template.hourly_rate)
        ));
        ids.push(id);
    }
    Ok(ids)
}

/// Draft and publish a job; `None` if the company cannot cover the budget
fn post(
    market: &Marketplace,
    company: &CompanyId,
    template: &JobTemplate,
) -> anyhow::Result<Option<JobId>> {
    let owner = Actor::Company(company.clone());
    let requirements = JobRequirements::new(template.category, template.budget)
        .with_required_tools(template.tools.iter().copied())
        .with_min_context(template.min_context)
        .with_min_trust_level(template.min_trust);
    let job = market.create_job(&owner, template.title, "", requirements)?;

    match market.publish_job(&owner, &job) {
        Ok(_) => {
            display::note(&format!("{} posted for {}", template.title, display::money(template.budget)));
            Ok(Some(job))
        }
        Err(MarketError::InsufficientFunds { .. }) => {
            display::skipped(&format!("{} left in draft, funds exhausted", template.title));
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Shortlist, collect bids, hire, deliver and review. Returns false when
/// nobody could bid.
async fn fill(
    market: &Arc<Marketplace>,
    company: &CompanyId,
    job_id: &JobId,
    revise: bool,
) -> anyhow::Result<bool> {
    let owner = Actor::Company(company.clone());
    let job = market.job(job_id)?.job;
    let shortlist = market.recommend_agents(job_id, SHORTLIST)?;

    let bids: Vec<_> = shortlist
        .iter()
        .filter(|ranked| ranked.agent.is_available())
        .map(|ranked| {
            let market = Arc::clone(market);
            let agent = ranked.agent.id.clone();
            let job_id = job_id.clone();
            let estimate =
                estimate_job_hours(job.category(), job.budget()) * ranked.agent.hourly_rate;
            let bid = estimate.min(job.budget());
            tokio::task::spawn_blocking(move || market.apply(&agent, &job_id, bid, "Ready to start"))
        })
        .collect();

    let mut applications: Vec<Application> = Vec::new();
    for bid in bids {
        match bid.await.context("bidding task panicked")? {
            Ok(application) => applications.push(application),
            Err(err) => tracing::debug!(error = %err, "bid not placed"),
        }
    }

    let Some(best) = applications.iter().max_by(|a, b| {
        a.match_score
            .total_cmp(&b.match_score)
            .then_with(|| b.agent_id.cmp(&a.agent_id))
    }) else {
        return Ok(false);
    };

    market.hire(&owner, job_id, &best.id)?;
    let worker = Actor::Agent(best.agent_id.clone());
    market.submit_deliverable(&worker, job_id, format!("Delivered: {}", job.title))?;

    if revise {
        market.request_revision(&owner, job_id, "Please tighten the summary")?;
        market.start_revision(&worker, job_id)?;
        market.submit_deliverable(&worker, job_id, format!("Revised: {}", job.title))?;
    }

    let quality = MatchQuality::from_score(best.match_score);
    let completion = market.approve(&owner, job_id, scores_for(quality), None)?;
    let name = market.agent(&best.agent_id)?.node.name;
    display::job_completed(
        &job.title,
        &name,
        quality,
        completion.transaction.net_amount,
        completion.transaction.fee_amount,
    );
    Ok(true)
}

fn scores_for(quality: MatchQuality) -> ReviewScores {
    match quality {
        MatchQuality::Excellent => ReviewScores::uniform(5),
        MatchQuality::Good => ReviewScores::new(5, 4, 4),
        MatchQuality::Moderate => ReviewScores::uniform(4),
        MatchQuality::Weak | MatchQuality::Poor => ReviewScores::new(3, 3, 4),
    }
}

fn print_reputation(market: &Marketplace, agents: &[AgentId]) -> anyhow::Result<()> {
    display::heading("Reputation");
    for agent_id in agents {
        let summary = market.reputation_summary(agent_id)?;
        let name = market.agent(agent_id)?.node.name;
        display::reputation(&name, &summary);
    }
    Ok(())
}
