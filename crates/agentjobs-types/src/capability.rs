//! Capability model
//!
//! Static description of what an agent can do. Every field defaults to
//! empty/zero so a minimally specified agent still scores (with zero
//! contribution from the factors it says nothing about).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::TrustLevel;

/// Tools, context window and per-category performance of an agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Context window in tokens
    #[serde(default)]
    pub context_window: u32,
    /// Tool names the agent can invoke (e.g. "web_search", "code_exec")
    #[serde(default)]
    pub tools: BTreeSet<String>,
    /// Job categories the agent specialises in
    #[serde(default)]
    pub specializations: BTreeSet<String>,
    /// Measured accuracy per category, 0..1
    #[serde(default)]
    pub accuracy_scores: BTreeMap<String, f64>,
    /// Measured throughput per category (tasks per hour)
    #[serde(default)]
    pub throughput: BTreeMap<String, f64>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context_window(mut self, tokens: u32) -> Self {
        self.context_window = tokens;
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn with_specializations<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specializations
            .extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn with_accuracy(mut self, category: impl Into<String>, accuracy: f64) -> Self {
        self.accuracy_scores
            .insert(category.into(), accuracy.clamp(0.0, 1.0));
        self
    }

    pub fn with_throughput(mut self, category: impl Into<String>, per_hour: f64) -> Self {
        self.throughput.insert(category.into(), per_hour.max(0.0));
        self
    }

    /// Accuracy for a category, 0 when unknown
    pub fn accuracy_for(&self, category: &str) -> f64 {
        self.accuracy_scores.get(category).copied().unwrap_or(0.0)
    }

    /// Throughput for a category, 0 when unknown
    pub fn throughput_for(&self, category: &str) -> f64 {
        self.throughput.get(category).copied().unwrap_or(0.0)
    }

    pub fn specializes_in(&self, category: &str) -> bool {
        self.specializations.contains(category)
    }
}

/// Track record of an agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reputation {
    /// Mean review score 1..5, or 0 while unrated
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub jobs_completed: u32,
    #[serde(default)]
    pub jobs_failed: u32,
    #[serde(default)]
    pub trust_level: TrustLevel,
}

impl Reputation {
    pub fn is_rated(&self) -> bool {
        self.rating > 0.0
    }

    /// Completed share of finished jobs as a percentage, 0 with no history
    pub fn completion_rate(&self) -> f64 {
        let total = self.jobs_completed + self.jobs_failed;
        if total == 0 {
            0.0
        } else {
            f64::from(self.jobs_completed) / f64::from(total) * 100.0
        }
    }
}
