//! bucket-prover: possession-proof tool for storage miners.
//!
//! Computes PDP proofs for stored fragments from a verifier challenge, the
//! fragment's authenticator tag and the fragment file. Chain submission and
//! transport are left to the caller; this tool only prints JSON.
//!
//! # Commands
//!
//! - `split`: report the block layout of a fragment
//! - `prove`: prove one fragment
//! - `aggregate`: aggregate `Sigma` over several tags
//! - `batch`: prove every fragment of a manifest concurrently
//!
//! # Example Usage
//!
//! ```bash
//! bucket-prover --config bucket.toml prove \
//!     --challenge challenge.json --tag frag0.tag.json --fragment frag0
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ProverConfig;

/// PDP proof generation for stored fragments.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the TOML configuration file (default: $BUCKET_CONFIG).
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override `log.level` from the configuration.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report how a fragment splits into blocks.
    Split {
        #[arg(long)]
        fragment: PathBuf,
    },
    /// Prove possession of one fragment.
    Prove {
        #[arg(long)]
        challenge: PathBuf,
        #[arg(long)]
        tag: PathBuf,
        #[arg(long)]
        fragment: PathBuf,
    },
    /// Aggregate the authenticators of several tags under one challenge.
    Aggregate {
        #[arg(long)]
        challenge: PathBuf,
        #[arg(long = "tag", required = true)]
        tags: Vec<PathBuf>,
    },
    /// Prove every fragment listed in a JSON manifest.
    Batch {
        #[arg(long)]
        manifest: PathBuf,
        /// Also aggregate `Sigma` over all tags of the manifest.
        #[arg(long)]
        aggregate: bool,
    },
}

fn init_tracing(level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("bucket_prover={level}").parse()?)
                .add_directive(format!("bucket_pdp={level}").parse()?),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ProverConfig::load(args.config.as_deref())?;
    let level = args.log_level.as_deref().unwrap_or(&config.log.level);
    init_tracing(level)?;

    info!(
        block_size = config.engine.block_size,
        verify_attestation = config.engine.verify_attestation,
        "bucket-prover starting"
    );

    match args.command {
        Command::Split { fragment } => {
            let summary = commands::split(&config, &fragment).await?;
            commands::print_json(&summary)?;
        }
        Command::Prove {
            challenge,
            tag,
            fragment,
        } => {
            let response = commands::prove(&config, &challenge, &tag, &fragment).await?;
            commands::print_json(&response)?;
            if !response.is_success() {
                bail!("proof failed: {}", response.status.msg);
            }
        }
        Command::Aggregate { challenge, tags } => {
            let proof = commands::aggregate(&config, &challenge, &tags).await?;
            commands::print_json(&proof)?;
        }
        Command::Batch {
            manifest,
            aggregate,
        } => {
            let report = commands::batch(&config, &manifest, aggregate).await?;
            commands::print_json(&report)?;
            if report.proofs.iter().any(|p| !p.is_success()) {
                bail!("one or more batch proofs failed");
            }
        }
    }

    Ok(())
}
