//! Poll command - wait for a claim record to appear.

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Args;
use claimwatch_core::{PollOutcome, PollState};
use claimwatch_fetch::{ClaimPoller, HttpClaimTransport, HttpClient};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the poll command.
#[derive(Args)]
pub struct PollArgs {
    /// Reference token from the checkout.
    pub reference_token: String,

    /// Shop domain sent with every lookup.
    #[arg(long)]
    pub shop: String,

    /// Delay between attempts in milliseconds (overrides config).
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Total lookups allowed (overrides config).
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Per-lookup timeout in milliseconds (overrides config).
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Lookup endpoint base URL (overrides config).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Header carrying the shop domain (overrides config).
    #[arg(long)]
    pub shop_header: Option<String>,
}

/// Runs the poll command and maps the outcome to an exit code.
pub async fn run(args: &PollArgs, cli: &Cli) -> Result<ExitCode> {
    let config = cli.load_config()?;
    let mut builder = config.query_builder(&args.reference_token, &args.shop);
    if let Some(ms) = args.interval_ms {
        builder = builder.poll_interval_ms(ms);
    }
    if let Some(n) = args.max_attempts {
        builder = builder.max_attempts(n);
    }
    if let Some(ms) = args.timeout_ms {
        builder = builder.attempt_timeout(Duration::from_millis(ms));
    }
    let query = builder.build()?;

    let base_url = args.base_url.as_deref().unwrap_or(&config.lookup.base_url);
    let shop_header = args
        .shop_header
        .as_deref()
        .unwrap_or(&config.lookup.shop_header);

    let client = HttpClient::with_timeout(query.attempt_timeout())?;
    let transport = HttpClaimTransport::with_client(client, base_url)
        .with_context(|| format!("invalid lookup URL {base_url}"))?
        .with_shop_header(shop_header)?;
    debug!(url = %transport.lookup_url(query.reference_token()), "Lookup endpoint");

    let links = config.links.claim_links()?;
    let text = TextFormatter::new(!cli.no_color, links.clone());
    let json = JsonFormatter::with_links(cli.pretty, links);

    let observer = {
        let text = text.clone();
        let json = json.clone();
        let format = cli.format;
        let quiet = cli.quiet;
        let max_attempts = query.max_attempts();
        move |state: &PollState| {
            if quiet {
                return;
            }
            match format {
                OutputFormat::Text => {
                    println!("{}", text.format_state(state, max_attempts, Local::now()));
                }
                OutputFormat::Json => match json.format_state(state, Utc::now()) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "Failed to encode state"),
                },
            }
        }
    };

    let poller = ClaimPoller::new(transport);
    let mut handle = poller.start(query, observer)?;

    let cancel = handle.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling poll");
            cancel.cancel();
        }
    });

    let outcome = handle.wait().await;
    interrupt.abort();
    info!(outcome = outcome.label(), "Poll finished");
    if let Some(err) = outcome.error() {
        debug!(protocol = err.is_protocol(), error = %err, "Lookup failure");
    }

    match cli.format {
        OutputFormat::Text if cli.quiet => println!("{}", text.format_outcome(&outcome)),
        OutputFormat::Text => {
            if let Some(record) = outcome.record() {
                println!("{}", text.format_link(record));
            }
        }
        OutputFormat::Json if cli.quiet => {
            println!("{}", json.format_outcome(&outcome, Utc::now())?);
        }
        OutputFormat::Json => {}
    }

    Ok(exit_code(&outcome))
}

/// Maps a poll outcome to the process exit code.
pub fn exit_code(outcome: &PollOutcome) -> ExitCode {
    match outcome {
        PollOutcome::Found(_) => ExitCode::Success,
        PollOutcome::Exhausted { .. } => ExitCode::Exhausted,
        PollOutcome::Cancelled => ExitCode::Cancelled,
        PollOutcome::Failed(_) => ExitCode::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimwatch_core::{ClaimError, ClaimRecord, ClaimStatus};
    use clap::Parser;

    #[test]
    fn test_exit_codes() {
        let record = ClaimRecord::new("abc", ClaimStatus::NotClaim, 1);
        assert_eq!(exit_code(&PollOutcome::Found(record)), ExitCode::Success);
        assert_eq!(
            exit_code(&PollOutcome::Exhausted { attempts: 3 }),
            ExitCode::Exhausted
        );
        assert_eq!(exit_code(&PollOutcome::Cancelled), ExitCode::Cancelled);
        assert_eq!(
            exit_code(&PollOutcome::Failed(ClaimError::Transport("x".into()))),
            ExitCode::Error
        );
        assert_eq!(ExitCode::Exhausted as i32, 2);
        assert_eq!(ExitCode::Cancelled as i32, 3);
    }

    #[test]
    fn test_parse_poll_args() {
        let cli = Cli::try_parse_from([
            "claimwatch",
            "poll",
            "ref-1",
            "--shop",
            "store.example",
            "--max-attempts",
            "3",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let crate::Commands::Poll(args) = cli.command else {
            panic!("expected poll");
        };
        assert_eq!(args.reference_token, "ref-1");
        assert_eq!(args.shop, "store.example");
        assert_eq!(args.max_attempts, Some(3));
        assert_eq!(args.interval_ms, None);
    }

    #[test]
    fn test_poll_requires_shop() {
        assert!(Cli::try_parse_from(["claimwatch", "poll", "ref-1"]).is_err());
    }

    #[test]
    fn test_link_status_parses() {
        let cli =
            Cli::try_parse_from(["claimwatch", "link", "tok", "--status", "claimed"]).unwrap();
        let crate::Commands::Link(args) = cli.command else {
            panic!("expected link");
        };
        assert_eq!(args.status, ClaimStatus::Claimed);

        assert!(Cli::try_parse_from(["claimwatch", "link", "tok", "--status", "bogus"]).is_err());
    }
}
