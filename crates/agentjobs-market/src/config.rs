//! Marketplace Configuration
//!
//! Layered loading: an optional explicit file, then `config/default` and
//! `config/local`, then `AGENTJOBS__*` environment variables. A `.env` file
//! is read first if present.

use agentjobs_core::{FeePolicy, PaymentMode, TextLimits};
use agentjobs_types::{Decimal, MarketError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] MarketError),
}

/// Marketplace configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default)]
    pub fees: FeeSettings,

    #[serde(default)]
    pub payments: PaymentSettings,

    #[serde(default)]
    pub limits: LimitSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fee settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSettings {
    /// Percentage of each release withheld as platform revenue
    #[serde(default = "default_fee_percent")]
    pub platform_fee_percent: Decimal,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            platform_fee_percent: default_fee_percent(),
        }
    }
}

/// Payment rail settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettings {
    #[serde(default)]
    pub mode: PaymentMode,
}

/// Free-text length limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitSettings {
    #[serde(default = "default_max_deliverable_chars")]
    pub max_deliverable_chars: usize,

    #[serde(default = "default_max_text_chars")]
    pub max_cover_letter_chars: usize,

    #[serde(default = "default_max_text_chars")]
    pub max_request_chars: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_deliverable_chars: default_max_deliverable_chars(),
            max_cover_letter_chars: default_max_text_chars(),
            max_request_chars: default_max_text_chars(),
        }
    }
}

impl From<&LimitSettings> for TextLimits {
    fn from(limits: &LimitSettings) -> Self {
        Self {
            max_deliverable_chars: limits.max_deliverable_chars,
            max_cover_letter_chars: limits.max_cover_letter_chars,
            max_request_chars: limits.max_request_chars,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_fee_percent() -> Decimal {
    FeePolicy::DEFAULT_PERCENT
}

fn default_max_deliverable_chars() -> usize {
    50_000
}

fn default_max_text_chars() -> usize {
    5_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl MarketConfig {
    /// Load configuration from files and environment
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("AGENTJOBS")
                    .separator("__")
                    .try_parsing(true),
            );

        let market_config: MarketConfig = builder.build()?.try_deserialize()?;
        market_config.validate()?;
        Ok(market_config)
    }

    /// Reject values the marketplace cannot run with
    pub fn validate(&self) -> Result<(), MarketError> {
        self.fee_policy()?;
        for (field, value) in [
            ("limits.max_deliverable_chars", self.limits.max_deliverable_chars),
            ("limits.max_cover_letter_chars", self.limits.max_cover_letter_chars),
            ("limits.max_request_chars", self.limits.max_request_chars),
        ] {
            if value == 0 {
                return Err(MarketError::invalid_input(field, "must be positive"));
            }
        }
        Ok(())
    }

    pub fn fee_policy(&self) -> Result<FeePolicy, MarketError> {
        FeePolicy::new(self.fees.platform_fee_percent)
    }

    pub fn text_limits(&self) -> TextLimits {
        TextLimits::from(&self.limits)
    }

    /// Configuration for local runs and tests
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            ..Default::default()
        }
    }
}
