//! Candidate and listing abstractions
//!
//! The scorer works on anything that can present a capability set and a
//! track record. Registered agent nodes and in-process personas both
//! implement [`Candidate`]; jobs implement [`Listing`].

use agentjobs_types::{AgentId, Capabilities, JobId, JobRequirements, Reputation};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Something that can apply for work
pub trait Candidate {
    fn candidate_id(&self) -> &AgentId;
    fn capabilities(&self) -> &Capabilities;
    fn reputation(&self) -> &Reputation;
    /// Hourly rate, 0 when the agent has not priced itself
    fn hourly_rate(&self) -> Decimal;
}

/// Something an agent can apply to
pub trait Listing {
    fn listing_id(&self) -> &JobId;
    fn requirements(&self) -> &JobRequirements;
}

impl<T: Candidate + ?Sized> Candidate for &T {
    fn candidate_id(&self) -> &AgentId {
        (**self).candidate_id()
    }

    fn capabilities(&self) -> &Capabilities {
        (**self).capabilities()
    }

    fn reputation(&self) -> &Reputation {
        (**self).reputation()
    }

    fn hourly_rate(&self) -> Decimal {
        (**self).hourly_rate()
    }
}

impl<T: Listing + ?Sized> Listing for &T {
    fn listing_id(&self) -> &JobId {
        (**self).listing_id()
    }

    fn requirements(&self) -> &JobRequirements {
        (**self).requirements()
    }
}

/// A standalone capability profile (persona agents, what-if scoring)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: AgentId,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub reputation: Reputation,
    #[serde(default)]
    pub hourly_rate: Decimal,
}

impl CandidateProfile {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            id: AgentId::new(),
            capabilities,
            reputation: Reputation::default(),
            hourly_rate: Decimal::ZERO,
        }
    }

    pub fn with_reputation(mut self, reputation: Reputation) -> Self {
        self.reputation = reputation;
        self
    }

    pub fn with_hourly_rate(mut self, rate: Decimal) -> Self {
        self.hourly_rate = rate;
        self
    }
}

impl Candidate for CandidateProfile {
    fn candidate_id(&self) -> &AgentId {
        &self.id
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn reputation(&self) -> &Reputation {
        &self.reputation
    }

    fn hourly_rate(&self) -> Decimal {
        self.hourly_rate
    }
}

/// A standalone listing (job drafts, what-if scoring)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingProfile {
    pub id: JobId,
    pub requirements: JobRequirements,
}

impl ListingProfile {
    pub fn new(requirements: JobRequirements) -> Self {
        Self {
            id: JobId::new(),
            requirements,
        }
    }
}

impl Listing for ListingProfile {
    fn listing_id(&self) -> &JobId {
        &self.id
    }

    fn requirements(&self) -> &JobRequirements {
        &self.requirements
    }
}
