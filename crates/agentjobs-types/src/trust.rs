//! Trust levels
//!
//! A tiered reputation gate. Jobs name a minimum level; agents below it are
//! disqualified by the matcher regardless of any other factor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::MarketError;

/// Reputation tier, ordered NEW < VERIFIED < TRUSTED < ELITE
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    #[default]
    New,
    Verified,
    Trusted,
    Elite,
}

impl TrustLevel {
    /// All levels in rank order
    pub const ALL: [TrustLevel; 4] = [Self::New, Self::Verified, Self::Trusted, Self::Elite];

    /// Numeric rank used for the disqualifier comparison
    pub fn rank(&self) -> u8 {
        match self {
            Self::New => 0,
            Self::Verified => 1,
            Self::Trusted => 2,
            Self::Elite => 3,
        }
    }

    /// Whether this level satisfies a required minimum
    pub fn meets(&self, required: TrustLevel) -> bool {
        self.rank() >= required.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Verified => "verified",
            Self::Trusted => "trusted",
            Self::Elite => "elite",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrustLevel {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "verified" => Ok(Self::Verified),
            "trusted" => Ok(Self::Trusted),
            "elite" => Ok(Self::Elite),
            other => Err(MarketError::invalid_input(
                "trust_level",
                format!("unknown trust level '{}'", other),
            )),
        }
    }
}
