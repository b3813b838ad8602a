//! disallowed-calls CLI tool.
//!
//! Usage:
//! ```bash
//! disallowed-calls check [OPTIONS] [PATH]
//! disallowed-calls list-rules
//! disallowed-calls init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Reports calls to forbidden functions, methods and static methods
#[derive(Parser)]
#[command(name = "disallowed-calls")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "DISALLOWED_CALLS_CONFIG")]
    config: Option<PathBuf>,

    /// Project root that `allow-in` patterns are relative to
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check call-site snapshots against the configured rules
    Check {
        /// Snapshot file, or directory searched for `*.calls.json`
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the configured rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let source = config_resolver::resolve(&cli.root, cli.config.as_deref());

    match cli.command {
        Commands::Check { path, format } => {
            commands::check::run(&path, &cli.root, format, &source)
        }
        Commands::ListRules => commands::list_rules::run(&cli.root, &source),
        Commands::Init { force } => commands::init::run(&cli.root, force),
    }
}
