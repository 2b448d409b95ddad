//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{diff_cmd, id_cmd, snapshot_cmd};
use crate::storage::{Config, SnapshotFormat};

#[derive(Parser)]
#[command(name = "rsnap")]
#[command(author, version, about = "Snapshot evaluated resource graphs into stable properties")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging (when RUST_LOG is unset)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to rsnap.toml, then the global config)
    #[arg(long, short = 'c', global = true, env = "RSNAP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Snapshot the resources declared in a heap dump
    Snapshot {
        /// Heap dump to read (JSON, or YAML for .yaml/.yml)
        dump: PathBuf,

        /// Write the checkpoint here instead of printing it
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Namespace for minted URNs (overrides dump and config)
        #[arg(long)]
        namespace: Option<String>,

        /// Checkpoint encoding when it cannot be inferred from the path
        #[arg(long)]
        encoding: Option<SnapshotFormat>,
    },

    /// Compare two checkpoints
    Diff {
        /// Earlier checkpoint
        old: PathBuf,

        /// Later checkpoint
        new: PathBuf,
    },

    /// Generate a unique hex identifier
    Id {
        /// Prefix (defaults to the configured prefix)
        #[arg(long)]
        prefix: Option<String>,

        /// Number of random bytes
        #[arg(long)]
        bytes: Option<usize>,

        /// Maximum length, prefix included
        #[arg(long)]
        max_len: Option<usize>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = Output::new(cli.format);
    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(namespace = %config.namespace, format = config.format.as_str(), "loaded configuration");

    match cli.command {
        Commands::Snapshot {
            dump,
            output: out,
            namespace,
            encoding,
        } => snapshot_cmd::run(
            &output,
            &config,
            &dump,
            out.as_deref(),
            namespace.as_deref(),
            encoding,
        )?,

        Commands::Diff { old, new } => diff_cmd::run(&output, &config, &old, &new)?,

        Commands::Id {
            prefix,
            bytes,
            max_len,
        } => id_cmd::run(&output, &config, prefix, bytes, max_len)?,
    }

    tracing::debug!("command completed");
    Ok(())
}

/// Installs the stderr subscriber; `RUST_LOG` takes precedence over `--verbose`
fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "resource_snapshot=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
