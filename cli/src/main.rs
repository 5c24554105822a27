//! Legacy Clock CLI - a dead-man's-switch will from the command line
//!
//! # Commands
//! - `legacy-clock connect <address>` - Bind the wallet session to an address
//! - `legacy-clock create ...` - Create a will for the connected testator
//! - `legacy-clock check-in` - Prove liveness, resetting the inactivity countdown
//! - `legacy-clock status [testator]` - Show the release state of a will
//! - `legacy-clock claim <testator> --key-share <share>` - Claim a releasable will

mod commands;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use legacy_clock_core::will::{DigitalAsset, InactivityPeriod};
use std::path::PathBuf;

use commands::App;
use config::LegacyClockConfig;

/// Legacy Clock CLI
#[derive(Parser)]
#[command(name = "legacy-clock")]
#[command(
    author,
    version,
    about = "Inactivity-based release of a digital will"
)]
struct Cli {
    /// Config file (default: ./legacy-clock.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect a wallet address as the acting principal
    Connect {
        /// Wallet address (e.g. 0x...)
        address: String,
    },

    /// Forget the connected wallet
    Disconnect,

    /// Print the connected wallet address
    Whoami,

    /// Create a will for the connected testator
    Create {
        /// Will content
        #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
        content: Option<String>,

        /// Read will content from a file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Beneficiary wallet address (repeatable)
        #[arg(short, long = "beneficiary", required = true)]
        beneficiaries: Vec<String>,

        /// Digital asset as DESCRIPTION=LOCATION (repeatable)
        #[arg(short, long = "asset", value_parser = commands::parse_asset)]
        assets: Vec<DigitalAsset>,

        /// Inactivity period in days (30, 90, 180 or 365)
        #[arg(short, long, default_value_t = InactivityPeriod::DEFAULT_DAYS)]
        period: u32,
    },

    /// Record a check-in for the connected testator
    CheckIn,

    /// Show the connected testator's own will
    Show,

    /// Look up a testator's will (content withheld)
    Find {
        /// Testator wallet address
        testator: String,
    },

    /// Show the release state of a will (default: your own)
    Status {
        /// Testator wallet address
        testator: Option<String>,
    },

    /// Claim a releasable will as a beneficiary
    Claim {
        /// Testator wallet address
        testator: String,

        /// Key share proving beneficiary membership
        #[arg(short, long)]
        key_share: String,
    },

    /// Revoke the connected testator's will
    Revoke,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = LegacyClockConfig::load(cli.config.as_deref())?;
    logging::init(&config)?;
    tracing::debug!(?config, "Configuration loaded");

    let app = App::open(&config, cli.json).await?;

    match cli.command {
        Commands::Connect { address } => commands::run_connect(&app, address).await,
        Commands::Disconnect => commands::run_disconnect(&app).await,
        Commands::Whoami => commands::run_whoami(&app),
        Commands::Create {
            content,
            content_file,
            beneficiaries,
            assets,
            period,
        } => {
            let content = match (content, content_file) {
                (Some(content), _) => content,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read will content: {}", path.display()))?,
                (None, None) => anyhow::bail!("Either --content or --content-file is required"),
            };
            commands::run_create(&app, content, beneficiaries, assets, period).await
        }
        Commands::CheckIn => commands::run_check_in(&app).await,
        Commands::Show => commands::run_show(&app).await,
        Commands::Find { testator } => commands::run_find(&app, testator).await,
        Commands::Status { testator } => commands::run_status(&app, testator).await,
        Commands::Claim {
            testator,
            key_share,
        } => commands::run_claim(&app, testator, key_share).await,
        Commands::Revoke => commands::run_revoke(&app).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "legacy-clock",
            "--json",
            "create",
            "--content",
            "All to Bob",
            "-b",
            "0xbob",
            "-b",
            "0xcarol",
            "--asset",
            "Laptop=office",
            "--period",
            "30",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Create {
                content,
                beneficiaries,
                assets,
                period,
                ..
            } => {
                assert_eq!(content.as_deref(), Some("All to Bob"));
                assert_eq!(beneficiaries, vec!["0xbob", "0xcarol"]);
                assert_eq!(assets, vec![DigitalAsset::new("Laptop", "office")]);
                assert_eq!(period, 30);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_create_defaults_period_and_requires_beneficiary() {
        let cli = Cli::try_parse_from(["legacy-clock", "create", "--content", "x", "-b", "0xb"])
            .unwrap();
        match cli.command {
            Commands::Create { period, .. } => assert_eq!(period, InactivityPeriod::DEFAULT_DAYS),
            _ => panic!("expected create"),
        }

        assert!(Cli::try_parse_from(["legacy-clock", "create", "--content", "x"]).is_err());
    }
}
