//! Command-line access to the kith decision core
//!
//! Runs single decisions against a seeded store, explains graph connections
//! and checks that every evaluation strategy agrees.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use kith_cli::commands::{agree, decisions, graph};
use kith_cli::CliContext;
use kith_core::StrategyKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kith")]
#[command(about = "Kith - authorization decisions for a journaling service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seed file path; defaults to the reference data set
    #[arg(short, long, global = true)]
    seed: Option<PathBuf>,

    /// Evaluation strategy, overriding config and environment
    #[arg(long, global = true, value_parser = parse_strategy)]
    strategy: Option<StrategyKind>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a credential to a user name
    Whoami {
        /// Raw Authorization header value, e.g. "Bearer 123"
        #[arg(long)]
        credential: Option<String>,
    },

    /// Read an entry as the holder of a credential
    ReadEntry {
        /// Raw Authorization header value
        #[arg(long)]
        credential: Option<String>,

        /// Entry id
        entry: String,
    },

    /// Send a friend request as the holder of a credential
    FriendRequest {
        /// Raw Authorization header value
        #[arg(long)]
        credential: Option<String>,

        /// Name of the user to befriend
        name: String,
    },

    /// Show the shortest chain of friendships between two users
    Connected {
        /// Starting user
        from: String,

        /// Destination user
        to: String,
    },

    /// Check that every strategy reaches the same verdicts
    Agree {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_strategy(value: &str) -> std::result::Result<StrategyKind, String> {
    value.parse().map_err(|e: kith_core::KithError| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = CliContext::load(cli.config.as_deref(), cli.seed.as_deref(), cli.strategy)?;

    match cli.command {
        Commands::Whoami { credential } => {
            println!("{}", decisions::whoami(&ctx, credential.as_deref())?);
        }

        Commands::ReadEntry { credential, entry } => {
            println!(
                "{}",
                decisions::read_entry(&ctx, credential.as_deref(), &entry)?
            );
        }

        Commands::FriendRequest { credential, name } => {
            println!(
                "{}",
                decisions::friend_request(&ctx, credential.as_deref(), &name)?
            );
        }

        Commands::Connected { from, to } => {
            println!("{}", graph::connected(&ctx, &from, &to)?);
        }

        Commands::Agree { json } => {
            let report = agree::run(&ctx.store, &ctx.config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.render());
            }
            if !report.is_unanimous() {
                bail!("strategies disagree on {} questions", report.disagreements.len());
            }
        }
    }

    Ok(())
}
