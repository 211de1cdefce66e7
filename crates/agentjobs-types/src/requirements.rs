//! Job requirements
//!
//! What a job demands from an applicant: hard feasibility gates (tools,
//! context window, trust level) and soft targets (accuracy, throughput) plus
//! the budget used for price scoring.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{MarketError, Result, TrustLevel};

/// Requirements a job places on applicants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    /// Job category (e.g. "support", "research", "code")
    pub category: String,
    /// Every listed tool must be present on the agent
    #[serde(default)]
    pub required_tools: BTreeSet<String>,
    /// Minimum context window, 0 for none
    #[serde(default)]
    pub min_context: u32,
    /// Minimum accuracy in the job category, 0 for none
    #[serde(default)]
    pub min_accuracy: f64,
    /// Minimum throughput in the job category, 0 for none
    #[serde(default)]
    pub min_throughput: f64,
    #[serde(default)]
    pub min_trust_level: TrustLevel,
    /// Total budget, strictly positive
    pub budget: Decimal,
}

impl JobRequirements {
    pub fn new(category: impl Into<String>, budget: Decimal) -> Self {
        Self {
            category: category.into(),
            required_tools: BTreeSet::new(),
            min_context: 0,
            min_accuracy: 0.0,
            min_throughput: 0.0,
            min_trust_level: TrustLevel::New,
            budget,
        }
    }

    pub fn with_required_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_tools
            .extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn with_min_context(mut self, tokens: u32) -> Self {
        self.min_context = tokens;
        self
    }

    pub fn with_min_accuracy(mut self, accuracy: f64) -> Self {
        self.min_accuracy = accuracy;
        self
    }

    pub fn with_min_throughput(mut self, per_hour: f64) -> Self {
        self.min_throughput = per_hour;
        self
    }

    pub fn with_min_trust_level(mut self, level: TrustLevel) -> Self {
        self.min_trust_level = level;
        self
    }

    /// Check shape constraints before a job is accepted into the marketplace
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(MarketError::invalid_input("category", "must not be empty"));
        }
        if self.budget <= Decimal::ZERO {
            return Err(MarketError::invalid_input(
                "budget",
                format!("must be positive, got {}", self.budget),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_accuracy) {
            return Err(MarketError::invalid_input(
                "min_accuracy",
                format!("must be within 0..1, got {}", self.min_accuracy),
            ));
        }
        if self.min_throughput < 0.0 || !self.min_throughput.is_finite() {
            return Err(MarketError::invalid_input(
                "min_throughput",
                "must be a non-negative number",
            ));
        }
        Ok(())
    }
}
