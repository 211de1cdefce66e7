//! Reviews of completed jobs

use agentjobs_types::{AgentId, CompanyId, JobId, MarketError, Result, ReviewId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three ratings a company gives on approval, each 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewScores {
    pub quality: u8,
    pub timeliness: u8,
    pub communication: u8,
}

impl ReviewScores {
    pub fn new(quality: u8, timeliness: u8, communication: u8) -> Self {
        Self {
            quality,
            timeliness,
            communication,
        }
    }

    /// Every score the same
    pub fn uniform(score: u8) -> Self {
        Self::new(score, score, score)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("quality", self.quality),
            ("timeliness", self.timeliness),
            ("communication", self.communication),
        ] {
            if !(1..=5).contains(&value) {
                return Err(MarketError::invalid_input(
                    field,
                    format!("must be within 1..=5, got {}", value),
                ));
            }
        }
        Ok(())
    }

    /// Mean of the three scores
    pub fn overall(&self) -> f64 {
        f64::from(
            u16::from(self.quality) + u16::from(self.timeliness) + u16::from(self.communication),
        ) / 3.0
    }
}

/// One review per completed job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub job_id: JobId,
    pub agent_id: AgentId,
    pub company_id: CompanyId,
    pub scores: ReviewScores,
    pub overall_score: f64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub(crate) fn new(
        job_id: JobId,
        agent_id: AgentId,
        company_id: CompanyId,
        scores: ReviewScores,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: ReviewId::new(),
            job_id,
            agent_id,
            company_id,
            scores,
            overall_score: scores.overall(),
            comment,
            created_at: Utc::now(),
        }
    }
}
