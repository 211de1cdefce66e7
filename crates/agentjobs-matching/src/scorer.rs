//! Match scorer
//!
//! `score(agent, job)` returns a value in `[0, 1]` and a per-factor breakdown.
//!
//! Hard disqualifiers short-circuit to zero with an all-zero breakdown:
//! 1. a required tool is missing
//! 2. the context window is below a non-zero `min_context`
//! 3. the trust level ranks below `min_trust_level`
//!
//! Feasible candidates are ranked by additive soft components, each capped
//! on its own, with the total clamped to 1.0.

use agentjobs_types::{JobRequirements, TrustLevel};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{estimate_job_hours, Candidate};

/// Weights and caps of the soft components
pub mod weights {
    /// Base tools score for any agent that has tools
    pub const TOOLS_BASE: f64 = 0.10;
    /// Added per tool beyond the required set
    pub const TOOLS_PER_EXTRA: f64 = 0.02;
    pub const TOOLS_CAP: f64 = 0.15;

    pub const CONTEXT_RATIO_WEIGHT: f64 = 0.1;
    pub const CONTEXT_CAP: f64 = 0.1;
    /// Flat context score when there is no requirement to exceed
    pub const CONTEXT_FLAT: f64 = 0.05;

    pub const THROUGHPUT_RATIO_WEIGHT: f64 = 0.15;
    pub const THROUGHPUT_CAP: f64 = 0.25;

    pub const ACCURACY_WEIGHT: f64 = 0.25;
    pub const ACCURACY_PARTIAL_WEIGHT: f64 = 0.15;

    /// Weight of `rating / 5`
    pub const REPUTATION_WEIGHT: f64 = 0.25;
    pub const VETERAN_JOBS: u32 = 100;
    pub const VETERAN_BONUS: f64 = 0.05;
    pub const EXPERIENCED_JOBS: u32 = 25;
    pub const EXPERIENCED_BONUS: f64 = 0.03;
    pub const REPUTATION_CAP: f64 = REPUTATION_WEIGHT + VETERAN_BONUS;

    pub const PRICE_WEIGHT: f64 = 0.15;
    pub const SPECIALIZATION_BONUS: f64 = 0.15;
}

/// Per-factor contributions; all zero when disqualified
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub tools_score: f64,
    pub context_score: f64,
    pub throughput_score: f64,
    pub accuracy_score: f64,
    pub reputation_score: f64,
    pub price_score: f64,
    pub specialization_score: f64,
    /// Clamped sum of the components
    pub total: f64,
}

impl MatchBreakdown {
    fn sum(&self) -> f64 {
        self.tools_score
            + self.context_score
            + self.throughput_score
            + self.accuracy_score
            + self.reputation_score
            + self.price_score
            + self.specialization_score
    }
}

/// Why an agent cannot take a job at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Disqualification {
    MissingTools { missing: Vec<String> },
    ContextTooSmall { required: u32, available: u32 },
    TrustTooLow { required: TrustLevel, actual: TrustLevel },
}

impl fmt::Display for Disqualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTools { missing } => {
                write!(f, "missing required tools: {}", missing.join(", "))
            }
            Self::ContextTooSmall { required, available } => {
                write!(f, "context window {} below required {}", available, required)
            }
            Self::TrustTooLow { required, actual } => {
                write!(f, "trust level {} below required {}", actual, required)
            }
        }
    }
}

/// Coarse label for a match score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    Excellent,
    Good,
    Moderate,
    Weak,
    Poor,
}

impl MatchQuality {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Excellent
        } else if score >= 0.6 {
            Self::Good
        } else if score >= 0.4 {
            Self::Moderate
        } else if score >= 0.2 {
            Self::Weak
        } else {
            Self::Poor
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent match - highly recommended",
            Self::Good => "Good match - worth considering",
            Self::Moderate => "Moderate match - review carefully",
            Self::Weak => "Weak match - may struggle with requirements",
            Self::Poor => "Poor match - not recommended",
        }
    }
}

/// Outcome of scoring one agent against one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    /// Compatibility in `[0, 1]`; zero iff disqualified
    pub value: f64,
    pub breakdown: MatchBreakdown,
    pub disqualification: Option<Disqualification>,
}

impl MatchScore {
    fn disqualified(reason: Disqualification) -> Self {
        Self {
            value: 0.0,
            breakdown: MatchBreakdown::default(),
            disqualification: Some(reason),
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.value > 0.0
    }

    pub fn quality(&self) -> MatchQuality {
        MatchQuality::from_score(self.value)
    }
}

/// Score a candidate against job requirements
pub fn score<C: Candidate + ?Sized>(agent: &C, job: &JobRequirements) -> MatchScore {
    if let Some(reason) = check_disqualifiers(agent, job) {
        tracing::debug!(agent_id = %agent.candidate_id(), %reason, "candidate disqualified");
        return MatchScore::disqualified(reason);
    }

    let mut breakdown = MatchBreakdown {
        tools_score: tools_score(agent, job),
        context_score: context_score(agent, job),
        throughput_score: throughput_score(agent, job),
        accuracy_score: accuracy_score(agent, job),
        reputation_score: reputation_score(agent),
        price_score: price_score(agent, job),
        specialization_score: specialization_score(agent, job),
        total: 0.0,
    };
    breakdown.total = breakdown.sum().clamp(0.0, 1.0);

    MatchScore {
        value: breakdown.total,
        breakdown,
        disqualification: None,
    }
}

fn check_disqualifiers<C: Candidate + ?Sized>(
    agent: &C,
    job: &JobRequirements,
) -> Option<Disqualification> {
    let caps = agent.capabilities();

    let missing: Vec<String> = job
        .required_tools
        .difference(&caps.tools)
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Some(Disqualification::MissingTools { missing });
    }

    if job.min_context > 0 && caps.context_window < job.min_context {
        return Some(Disqualification::ContextTooSmall {
            required: job.min_context,
            available: caps.context_window,
        });
    }

    let actual = agent.reputation().trust_level;
    if !actual.meets(job.min_trust_level) {
        return Some(Disqualification::TrustTooLow {
            required: job.min_trust_level,
            actual,
        });
    }

    None
}

fn tools_score<C: Candidate + ?Sized>(agent: &C, job: &JobRequirements) -> f64 {
    let tools = &agent.capabilities().tools;
    if tools.is_empty() {
        return 0.0;
    }
    let extra = tools.difference(&job.required_tools).count() as f64;
    (weights::TOOLS_BASE + extra * weights::TOOLS_PER_EXTRA).min(weights::TOOLS_CAP)
}

fn context_score<C: Candidate + ?Sized>(agent: &C, job: &JobRequirements) -> f64 {
    let window = agent.capabilities().context_window;
    if job.min_context > 0 && window > job.min_context {
        let ratio = f64::from(window) / f64::from(job.min_context);
        ((ratio - 1.0) * weights::CONTEXT_RATIO_WEIGHT).min(weights::CONTEXT_CAP)
    } else {
        weights::CONTEXT_FLAT
    }
}

fn throughput_score<C: Candidate + ?Sized>(agent: &C, job: &JobRequirements) -> f64 {
    if job.min_throughput <= 0.0 {
        return 0.0;
    }
    let throughput = agent.capabilities().throughput_for(&job.category);
    if throughput < job.min_throughput {
        return 0.0;
    }
    (throughput / job.min_throughput * weights::THROUGHPUT_RATIO_WEIGHT)
        .min(weights::THROUGHPUT_CAP)
}

fn accuracy_score<C: Candidate + ?Sized>(agent: &C, job: &JobRequirements) -> f64 {
    if job.min_accuracy <= 0.0 {
        return 0.0;
    }
    let accuracy = agent.capabilities().accuracy_for(&job.category);
    if accuracy >= job.min_accuracy {
        (accuracy * weights::ACCURACY_WEIGHT).min(weights::ACCURACY_WEIGHT)
    } else if accuracy > 0.0 {
        accuracy / job.min_accuracy * weights::ACCURACY_PARTIAL_WEIGHT
    } else {
        0.0
    }
}

fn reputation_score<C: Candidate + ?Sized>(agent: &C) -> f64 {
    let rep = agent.reputation();
    if !rep.is_rated() {
        return 0.0;
    }
    let base = (rep.rating.min(5.0) / 5.0) * weights::REPUTATION_WEIGHT;
    let bonus = if rep.jobs_completed >= weights::VETERAN_JOBS {
        weights::VETERAN_BONUS
    } else if rep.jobs_completed >= weights::EXPERIENCED_JOBS {
        weights::EXPERIENCED_BONUS
    } else {
        0.0
    };
    (base + bonus).min(weights::REPUTATION_CAP)
}

fn price_score<C: Candidate + ?Sized>(agent: &C, job: &JobRequirements) -> f64 {
    let rate = agent.hourly_rate();
    if rate <= Decimal::ZERO || job.budget <= Decimal::ZERO {
        return 0.0;
    }
    let estimated_cost = rate * estimate_job_hours(&job.category, job.budget);
    if estimated_cost > job.budget {
        return 0.0;
    }
    let headroom = Decimal::ONE - estimated_cost / job.budget;
    headroom.to_f64().unwrap_or(0.0).clamp(0.0, 1.0) * weights::PRICE_WEIGHT
}

fn specialization_score<C: Candidate + ?Sized>(agent: &C, job: &JobRequirements) -> f64 {
    if agent.capabilities().specializes_in(&job.category) {
        weights::SPECIALIZATION_BONUS
    } else {
        0.0
    }
}
