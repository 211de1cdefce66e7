//! Reputation maintenance
//!
//! Ratings are the mean overall score of an agent's reviews. Trust levels
//! are promoted from completed-job counts and rating, and never demoted.

use agentjobs_types::{AgentId, Decimal, TrustLevel};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{AgentNode, Review};

/// Mean overall score, 0 when there are no reviews
pub fn mean_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    reviews.iter().map(|r| r.overall_score).sum::<f64>() / reviews.len() as f64
}

/// Highest level earned by a track record
pub fn earned_trust_level(jobs_completed: u32, rating: f64) -> TrustLevel {
    if jobs_completed >= 50 && rating >= 4.5 {
        TrustLevel::Elite
    } else if jobs_completed >= 20 && rating >= 4.0 {
        TrustLevel::Trusted
    } else if jobs_completed >= 5 && rating >= 3.5 {
        TrustLevel::Verified
    } else {
        TrustLevel::New
    }
}

/// Recompute rating and trust level from the agent's full review history
pub fn recompute(agent: &mut AgentNode, reviews: &[Review]) {
    let rep = &mut agent.reputation;
    rep.rating = mean_rating(reviews);
    let earned = earned_trust_level(rep.jobs_completed, rep.rating);
    if earned > rep.trust_level {
        tracing::info!(
            agent_id = %agent.id,
            from = %rep.trust_level,
            to = %earned,
            "trust level promoted"
        );
        rep.trust_level = earned;
    }
}

/// Achievement badges shown on agent profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Centurion,
    Veteran,
    Experienced,
    TopRated,
    HighlyRated,
    HighEarner,
    Established,
    Versatile,
    Specialist,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Centurion => "Centurion",
            Self::Veteran => "Veteran",
            Self::Experienced => "Experienced",
            Self::TopRated => "Top Rated",
            Self::HighlyRated => "Highly Rated",
            Self::HighEarner => "High Earner",
            Self::Established => "Established",
            Self::Versatile => "Versatile",
            Self::Specialist => "Specialist",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Centurion => "100+ jobs completed",
            Self::Veteran => "50+ jobs completed",
            Self::Experienced => "10+ jobs completed",
            Self::TopRated => "4.9+ rating",
            Self::HighlyRated => "4.5+ rating",
            Self::HighEarner => "10k+ earned",
            Self::Established => "1k+ earned",
            Self::Versatile => "3+ specializations",
            Self::Specialist => "Focused expertise",
        }
    }
}

pub fn badges(agent: &AgentNode) -> Vec<Badge> {
    let rep = &agent.reputation;
    let mut badges = Vec::new();

    if rep.jobs_completed >= 100 {
        badges.push(Badge::Centurion);
    } else if rep.jobs_completed >= 50 {
        badges.push(Badge::Veteran);
    } else if rep.jobs_completed >= 10 {
        badges.push(Badge::Experienced);
    }

    if rep.rating >= 4.9 {
        badges.push(Badge::TopRated);
    } else if rep.rating >= 4.5 {
        badges.push(Badge::HighlyRated);
    }

    if agent.total_earned >= dec!(10000) {
        badges.push(Badge::HighEarner);
    } else if agent.total_earned >= dec!(1000) {
        badges.push(Badge::Established);
    }

    match agent.capabilities.specializations.len() {
        0 | 2 => {}
        1 => badges.push(Badge::Specialist),
        _ => badges.push(Badge::Versatile),
    }

    badges
}

/// Public reputation view of an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationSummary {
    pub agent_id: AgentId,
    pub rating: f64,
    pub trust_level: TrustLevel,
    pub jobs_completed: u32,
    pub jobs_failed: u32,
    /// Percentage, one decimal place
    pub completion_rate: f64,
    pub total_earned: Decimal,
    pub badges: Vec<Badge>,
}

pub fn summarize(agent: &AgentNode) -> ReputationSummary {
    let rep = &agent.reputation;
    ReputationSummary {
        agent_id: agent.id.clone(),
        rating: rep.rating,
        trust_level: rep.trust_level,
        jobs_completed: rep.jobs_completed,
        jobs_failed: rep.jobs_failed,
        completion_rate: (rep.completion_rate() * 10.0).round() / 10.0,
        total_earned: agent.total_earned,
        badges: badges(agent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewScores;
    use agentjobs_types::{Capabilities, CompanyId, JobId};

    fn review(agent: &AgentNode, score: u8) -> Review {
        Review::new(
            JobId::new(),
            agent.id.clone(),
            CompanyId::new(),
            ReviewScores::uniform(score),
            None,
        )
    }

    #[test]
    fn test_trust_thresholds() {
        assert_eq!(earned_trust_level(4, 5.0), TrustLevel::New);
        assert_eq!(earned_trust_level(5, 3.5), TrustLevel::Verified);
        assert_eq!(earned_trust_level(20, 4.0), TrustLevel::Trusted);
        assert_eq!(earned_trust_level(50, 4.4), TrustLevel::Trusted);
        assert_eq!(earned_trust_level(50, 4.5), TrustLevel::Elite);
    }

    #[test]
    fn test_recompute_promotes_but_never_demotes() {
        let mut agent = AgentNode::new("a", Capabilities::default());
        agent.reputation.jobs_completed = 5;
        let good: Vec<Review> = (0..5).map(|_| review(&agent, 4)).collect();

        recompute(&mut agent, &good);
        assert_eq!(agent.reputation.rating, 4.0);
        assert_eq!(agent.reputation.trust_level, TrustLevel::Verified);

        let mut mixed = good.clone();
        mixed.extend((0..10).map(|_| review(&agent, 1)));
        recompute(&mut agent, &mixed);
        assert!(agent.reputation.rating < 3.5);
        assert_eq!(agent.reputation.trust_level, TrustLevel::Verified);
    }

    #[test]
    fn test_badges() {
        let mut agent = AgentNode::new(
            "a",
            Capabilities::new().with_specializations(["support", "code", "data"]),
        );
        agent.reputation.jobs_completed = 60;
        agent.reputation.rating = 4.6;
        agent.total_earned = dec!(1500);

        assert_eq!(
            badges(&agent),
            vec![
                Badge::Veteran,
                Badge::HighlyRated,
                Badge::Established,
                Badge::Versatile
            ]
        );
    }

    #[test]
    fn test_summary_completion_rate() {
        let mut agent = AgentNode::new("a", Capabilities::new().with_specializations(["code"]));
        agent.reputation.jobs_completed = 2;
        agent.reputation.jobs_failed = 1;

        let summary = summarize(&agent);
        assert_eq!(summary.completion_rate, 66.7);
        assert_eq!(summary.badges, vec![Badge::Specialist]);
        assert_eq!(mean_rating(&[]), 0.0);
    }
}
