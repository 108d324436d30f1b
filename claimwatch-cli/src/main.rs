// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! ClaimWatch CLI - wait for a post-purchase reward to appear.
//!
//! # Examples
//!
//! ```bash
//! # Poll for the reward attached to a checkout
//! claimwatch poll 3f1c9a --shop my-store.myshopify.com
//!
//! # Tighter budget, JSON lines
//! claimwatch poll 3f1c9a --shop my-store.myshopify.com --max-attempts 3 --format json
//!
//! # Where should the shopper go?
//! claimwatch link abc --status notClaim
//!
//! # Configuration
//! claimwatch config init
//! claimwatch config show
//! ```

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use claimwatch_store::Config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{config, link, poll};

// ============================================================================
// CLI Definition
// ============================================================================

/// ClaimWatch CLI - post-purchase reward polling.
#[derive(Parser)]
#[command(name = "claimwatch")]
#[command(about = "Poll the rewards service for a post-purchase claim")]
#[command(long_about = r#"
ClaimWatch asks the rewards service whether a reward record exists for a
checkout's reference token, retrying on a fixed interval until the record
appears or the attempt budget runs out.

Examples:
  claimwatch poll <token> --shop <domain>   # Wait for the reward
  claimwatch link <token> --status claimed  # Print the shopper link
  claimwatch config show                    # Show configuration
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (defaults to the user config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (final result only).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Returns the configuration file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Loads and validates the configuration file in effect.
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        Config::load_from(&path).with_context(|| format!("loading {}", path.display()))
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Poll for a claim record until found, exhausted, or interrupted.
    #[command(visible_alias = "p")]
    Poll(poll::PollArgs),

    /// Print the shopper link for a claim record.
    #[command(visible_alias = "l")]
    Link(link::LinkArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success (record found).
    Success = 0,
    /// General error or failed lookup.
    Error = 1,
    /// Attempt budget exhausted without a record.
    Exhausted = 2,
    /// Interrupted before a result.
    Cancelled = 3,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: &str) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("claimwatch=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("claimwatch={level},warn")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // An unusable config file must not block `config init` or `config path`
    let log_level = Config::load_from(&cli.config_path())
        .map_or_else(|_| "info".to_string(), |config| config.general.log_level);
    setup_logging(cli.verbose, cli.quiet, &log_level);

    let result = match &cli.command {
        Commands::Poll(args) => poll::run(args, &cli).await,
        Commands::Link(args) => link::run(args, &cli).map(|()| ExitCode::Success),
        Commands::Config(args) => config::run(args, &cli).map(|()| ExitCode::Success),
    };

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => std::process::exit(code as i32),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(ExitCode::Error as i32);
        }
    }
}
