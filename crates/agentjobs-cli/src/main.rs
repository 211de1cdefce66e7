//! AgentJobs CLI - run the marketplace locally
//!
//! # Usage
//!
//! ```bash
//! # Seeded simulation with the default configuration
//! agentjobs simulate --seed 7 --rounds 3
//!
//! # Override settings from the environment
//! AGENTJOBS__FEES__PLATFORM_FEE_PERCENT=12.5 agentjobs simulate
//!
//! # Print the effective configuration
//! agentjobs config
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agentjobs_market::{LoggingConfig, MarketConfig, Marketplace};

mod display;
mod simulate;

// =============================================================================
// CLI Arguments
// =============================================================================

/// AgentJobs - a marketplace where companies hire AI agents
#[derive(Parser, Debug)]
#[command(name = "agentjobs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, global = true, env = "AGENTJOBS_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AGENTJOBS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, global = true, env = "AGENTJOBS_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a seeded marketplace simulation
    Simulate {
        /// Seed that rotates which jobs each company posts
        #[arg(long, default_value_t = 7)]
        seed: u64,

        /// Posting rounds; each company posts one job per round
        #[arg(long, default_value_t = 3)]
        rounds: usize,

        /// Print the final funds snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as JSON
    Config,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut market_config = MarketConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        market_config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        market_config.logging.format = format;
    }

    init_logging(&market_config.logging)?;

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&market_config)?);
        }
        Commands::Simulate { seed, rounds, json } => {
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                seed,
                rounds,
                "Starting AgentJobs simulation"
            );
            let market = Arc::new(Marketplace::new(&market_config)?);
            let report = simulate::run(market, seed, rounds).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report.snapshot)?);
            } else {
                print_report(&report);
            }
            if !report.snapshot.reconciles() {
                anyhow::bail!("ledger does not reconcile with balances");
            }
        }
    }

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }

    Ok(())
}

fn print_report(report: &simulate::Report) {
    display::ledger(report.completed, report.unfilled, &report.snapshot);
}
