//! Config command - manage configuration.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use claimwatch_store::Config;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show the configuration file path.
    Path,

    /// Write a configuration file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
///
/// Only `show` needs a valid file; `path` and `init` work over a broken one.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, &cli.load_config()?),
        ConfigAction::Path => show_path(cli),
        ConfigAction::Init { force } => init_config(cli, *force),
    }
}

fn show_config(cli: &Cli, config: &Config) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color, config.links.claim_links()?);
            println!("{}", formatter.format_config(config));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(config)?);
        }
    }

    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Config file: {}", path.display());
            if !path.exists() {
                println!("(not created yet; defaults in use)");
            }
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_file": path.display().to_string(),
                "exists": path.exists(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = cli.config_path();
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to(&path)?;
    info!(path = %path.display(), "Wrote default configuration");

    if !cli.quiet {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Commands;
    use clap::Parser;
    use tempfile::TempDir;

    fn config_command(path: &std::path::Path, action: &[&str]) -> Cli {
        let mut argv = vec!["claimwatch", "--quiet", "--config", path.to_str().unwrap(), "config"];
        argv.extend_from_slice(action);
        Cli::try_parse_from(argv).unwrap()
    }

    fn run_config(cli: &Cli) -> Result<()> {
        let Commands::Config(args) = &cli.command else {
            panic!("expected config");
        };
        run(args, cli)
    }

    #[test]
    fn test_init_force_replaces_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "poll": { "max_attempts": 0 } }"#).unwrap();

        assert!(run_config(&config_command(&path, &["show"])).is_err());
        assert!(run_config(&config_command(&path, &["path"])).is_ok());

        run_config(&config_command(&path, &["init", "--force"])).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
        assert!(run_config(&config_command(&path, &["show"])).is_ok());
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        run_config(&config_command(&path, &["init"])).unwrap();
        assert!(path.exists());

        let err = run_config(&config_command(&path, &["init"])).unwrap_err();
        assert!(err.to_string().contains("--force"));
    }
}
