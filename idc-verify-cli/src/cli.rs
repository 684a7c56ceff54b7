//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Levels accepted by `--log-level`; the same set `general.log_level` allows.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// idc-verify -- apply, verify and tear down an Identity Center module.
///
/// Use `idc-verify <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "idc-verify", version, about, long_about = None)]
pub struct Cli {
    /// Path to the idc-verify.toml configuration file.
    #[arg(short, long, default_value = "idc-verify.toml")]
    pub config: PathBuf,

    /// Override log level.
    #[arg(long, global = true, value_parser = LOG_LEVELS)]
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
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply the module, verify its outputs, then destroy it.
    Run(RunArgs),

    /// Print every output of the applied configuration.
    Outputs(TargetArgs),

    /// Destroy the configuration (manual cleanup).
    Destroy(TargetArgs),

    /// Manage configuration.
    Config(ConfigArgs),

    /// Build the Identity Center assignment report from snapshots.
    Report(ReportArgs),
}

// ---- run ----

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Terraform configuration directory (overrides `terraform.dir`).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Seconds to wait after the primary destroy (overrides `verify.settle_secs`).
    #[arg(long)]
    pub settle_secs: Option<u64>,
}

// ---- outputs / destroy ----

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Terraform configuration directory (overrides `terraform.dir`).
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

// ---- config ----

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
        /// Show only a specific section (general, terraform, verify, report).
        #[arg(long)]
        section: Option<String>,
    },
}

// ---- report ----

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Permission set assignment snapshot (JSON).
    #[arg(long)]
    pub assignments: PathBuf,

    /// User and group directory snapshot (JSON).
    #[arg(long)]
    pub directory: PathBuf,

    /// Directory for the CSV files (default: `report.output_dir/report.folder_name`).
    #[arg(long)]
    pub out: Option<PathBuf>,
}
