//! Ranking engine
//!
//! Orders agents for a job, and jobs for an agent. Ties always break on the
//! id ascending so a ranking is reproducible for identical inputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{estimate_job_hours, score, Candidate, Listing, MatchScore};

/// An agent with its score against one job
#[derive(Debug, Clone)]
pub struct RankedAgent<C> {
    pub agent: C,
    pub score: MatchScore,
}

/// Rank candidates for a job.
///
/// Zero-score (disqualified) agents are dropped; the rest are ordered by
/// score descending, then agent id ascending.
pub fn rank_agents_for_job<C, I>(agents: I, job: &impl Listing) -> Vec<RankedAgent<C>>
where
    C: Candidate,
    I: IntoIterator<Item = C>,
{
    let requirements = job.requirements();
    let mut ranked: Vec<RankedAgent<C>> = agents
        .into_iter()
        .filter_map(|agent| {
            let score = score(&agent, requirements);
            score.is_feasible().then_some(RankedAgent { agent, score })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .value
            .total_cmp(&a.score.value)
            .then_with(|| a.agent.candidate_id().cmp(b.agent.candidate_id()))
    });

    tracing::debug!(
        job_id = %job.listing_id(),
        candidates = ranked.len(),
        "ranked agents for job"
    );
    ranked
}

/// How crowded a job is, from its live application count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competition {
    Low,
    Medium,
    High,
}

impl Competition {
    pub fn from_applications(count: usize) -> Self {
        if count < 3 {
            Self::Low
        } else if count < 8 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Fraction of the match score lost when ranking jobs for an agent
    pub fn penalty(&self) -> f64 {
        match self {
            Self::Low => 0.0,
            Self::Medium => 0.1,
            Self::High => 0.2,
        }
    }
}

/// A job with its score for one agent
#[derive(Debug, Clone)]
pub struct RankedJob<L> {
    pub listing: L,
    pub match_score: MatchScore,
    pub competition: Competition,
    /// Match score reduced by the competition penalty
    pub adjusted_score: f64,
    /// Budget minus half the agent's estimated cost for the job
    pub expected_profit: Decimal,
}

/// Rank open jobs for an agent.
///
/// Each job comes with its current application count. Infeasible jobs are
/// dropped; the rest are ordered by adjusted score descending, then job id
/// ascending.
pub fn rank_jobs_for_agent<L, I>(agent: &impl Candidate, jobs: I) -> Vec<RankedJob<L>>
where
    L: Listing,
    I: IntoIterator<Item = (L, usize)>,
{
    let half = Decimal::new(5, 1);
    let mut ranked: Vec<RankedJob<L>> = jobs
        .into_iter()
        .filter_map(|(listing, applications)| {
            let requirements = listing.requirements();
            let match_score = score(agent, requirements);
            if !match_score.is_feasible() {
                return None;
            }
            let competition = Competition::from_applications(applications);
            let adjusted_score = match_score.value * (1.0 - competition.penalty());
            let hours = estimate_job_hours(&requirements.category, requirements.budget);
            let expected_profit = requirements.budget - hours * agent.hourly_rate() * half;
            Some(RankedJob {
                listing,
                match_score,
                competition,
                adjusted_score,
                expected_profit,
            })
        })
        .collect();

    ranked.sort_by(|a, b| match b.adjusted_score.total_cmp(&a.adjusted_score) {
        Ordering::Equal => a.listing.listing_id().cmp(b.listing.listing_id()),
        other => other,
    });

    tracing::debug!(
        agent_id = %agent.candidate_id(),
        jobs = ranked.len(),
        "ranked jobs for agent"
    );
    ranked
}
