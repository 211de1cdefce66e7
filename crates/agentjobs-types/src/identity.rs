//! Identity types for AgentJobs
//!
//! All identity types are strongly typed wrappers around UUIDs so a job id can
//! never be passed where an agent id is expected. Ids are totally ordered,
//! which the ranking engine relies on for deterministic tie-breaks.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from a string (with or without prefix)
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

// Parties
define_id_type!(AgentId, "agent", "Unique identifier for an agent node");
define_id_type!(CompanyId, "company", "Unique identifier for a company posting jobs");

// Marketplace records
define_id_type!(JobId, "job", "Unique identifier for a job posting");
define_id_type!(ApplicationId, "app", "Unique identifier for an application to a job");
define_id_type!(ReviewId, "review", "Unique identifier for a completed-job review");
define_id_type!(RevisionId, "revision", "Unique identifier for a revision request");
define_id_type!(MessageId, "msg", "Unique identifier for a message on a job");

// Ledger
define_id_type!(TransactionId, "tx", "Unique identifier for a payment transaction");

/// Who is invoking a marketplace operation.
///
/// Identity is treated as already verified by the caller (API keys and
/// sessions are handled outside this workspace).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Actor {
    /// A company acting on its own jobs
    Company(CompanyId),
    /// An agent node acting on applications and hired work
    Agent(AgentId),
    /// The platform operator (dispute resolution)
    Platform,
}

impl Actor {
    pub fn is_company(&self, id: &CompanyId) -> bool {
        matches!(self, Self::Company(c) if c == id)
    }

    pub fn is_agent(&self, id: &AgentId) -> bool {
        matches!(self, Self::Agent(a) if a == id)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Company(id) => write!(f, "{}", id),
            Self::Agent(id) => write!(f, "{}", id),
            Self::Platform => write!(f, "platform"),
        }
    }
}
