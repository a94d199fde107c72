//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// compscan -- component pattern matching over scanned file inventories.
///
/// Use `compscan <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "compscan", version, about, long_about = None)]
pub struct Cli {
    /// Path to the compscan.toml configuration file.
    #[arg(short, long, default_value = "compscan.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Match component patterns against a scanned-file inventory.
    Scan(ScanArgs),

    /// Manage declarative contributor rules.
    Rules(RulesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Run extraction and both matching passes over an inventory file.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// JSON array of `{ "path", "checksum", "root_paths" }` entries.
    pub inventory: PathBuf,

    /// Contributor rule directory (default: `[matcher] rules_dir`).
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Skip the deferred matching pass.
    #[arg(long)]
    pub no_deferred: bool,

    /// Enclosing asset ids, outermost first (repeatable).
    #[arg(long = "asset-id")]
    pub asset_ids: Vec<String>,
}

// ---- rules ----

/// Manage declarative contributor rules.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// Validate rule files without running a scan.
    Validate {
        /// Directory containing TOML rule files.
        #[arg(default_value = "/etc/compscan/contributors")]
        path: PathBuf,
    },
}

// ---- config ----

/// Manage compscan configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, matcher).
        #[arg(long)]
        section: Option<String>,
    },
}
