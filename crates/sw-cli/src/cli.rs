//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use sw_core::DbKind;

/// Stepwise - apply versioned SQL script folders to a database
#[derive(Parser, Debug)]
#[command(name = "stepwise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands.
///
/// Each setting overrides the matching field of `stepwise.yml`.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory containing stepwise.yml
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Explicit config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project name (version table key and scripts folder prefix)
    #[arg(long, global = true, env = "STEPWISE_PROJECT")]
    pub project: Option<String>,

    /// Database engine (postgres, duckdb, sqlserver)
    #[arg(short, long, global = true, env = "STEPWISE_ENGINE")]
    pub engine: Option<DbKind>,

    /// Connection string of a user with DDL rights
    #[arg(long, global = true, env = "STEPWISE_DDL", hide_env_values = true)]
    pub ddl: Option<String>,

    /// Superuser connection string, enables 00_CreateDB
    #[arg(long, global = true, env = "STEPWISE_MASTER", hide_env_values = true)]
    pub master: Option<String>,

    /// Scripts root, skipping the search next to the executable
    #[arg(long, global = true, env = "STEPWISE_SCRIPTS_ROOT")]
    pub scripts_root: Option<PathBuf>,

    /// Per-script timeout in seconds
    #[arg(long, global = true, env = "STEPWISE_TIMEOUT")]
    pub timeout: Option<u64>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database if needed and apply pending version folders
    Migrate(MigrateArgs),

    /// Show the applied version and pending folders
    Status(StatusArgs),

    /// Check whether the target database exists
    Exists,
}

/// Arguments for the migrate command
#[derive(Args, Debug, Clone, Default)]
pub struct MigrateArgs {
    /// On failure print only the innermost error
    #[arg(long)]
    pub short: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the status command
#[derive(Args, Debug, Clone, Default)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
