//! Link command - show where a shopper should go for a claim record.

use anyhow::Result;
use clap::Args;
use claimwatch_core::{ClaimLinks, ClaimRecord, ClaimStatus};
use tracing::debug;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the link command.
#[derive(Args)]
pub struct LinkArgs {
    /// Reward token from the claim record.
    pub token: String,

    /// Claim status (notClaim or claimed).
    #[arg(long, short = 's', default_value = "notClaim")]
    pub status: ClaimStatus,

    /// Amount in minor units, shown alongside the link.
    #[arg(long, default_value_t = 0)]
    pub amount: u64,

    /// Consumer site origin (overrides config).
    #[arg(long)]
    pub consumer_base: Option<String>,
}

/// Runs the link command.
pub fn run(args: &LinkArgs, cli: &Cli) -> Result<()> {
    let links = match &args.consumer_base {
        Some(base) => ClaimLinks::new(base)?,
        None => cli.load_config()?.links.claim_links()?,
    };
    debug!(base = %links.consumer_base(), "Consumer site");
    let record = ClaimRecord::new(args.token.clone(), args.status, args.amount);

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color, links);
            println!("{}", formatter.format_link(&record));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::with_links(cli.pretty, links);
            println!("{}", formatter.format_record(&record)?);
        }
    }

    Ok(())
}
