//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// ZFS pool health checker with debounced mail alerts
///
/// Meant to be run periodically from cron or a systemd timer. Each run
/// checks every pool once and mails an alert for unhealthy pools, at most
/// once per debounce window per pool.
#[derive(Parser, Debug)]
#[command(name = "zpoolwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "ZPOOLWATCH_CONFIG")]
    pub config: Option<String>,

    /// Dry run mode - evaluate pools but send and record nothing
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Alert recipient
    #[arg(long, global = true, env = "ZPOOLWATCH_RECIPIENT")]
    pub recipient: Option<String>,

    /// Minimum seconds between two alerts for the same pool
    #[arg(long, global = true, value_name = "SECONDS")]
    pub window: Option<u64>,

    /// Pool state considered healthy
    #[arg(long, global = true, value_name = "STATE")]
    pub expected_health: Option<String>,

    /// Directory holding per-pool alert records
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Subcommand (defaults to `check`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check all pools once and send due alerts
    Check,

    /// Show pool health without alerting
    Status,

    /// Inspect or reset alert records
    State(StateArgs),

    /// Print the effective configuration
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for state commands
#[derive(Parser, Debug)]
pub struct StateArgs {
    #[command(subcommand)]
    pub command: StateCommands,
}

/// State subcommands
#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// List alert records and their age
    Show,

    /// Forget the last alert for a pool so the next check may alert again
    Clear {
        /// Pool name
        pool: String,
    },
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
