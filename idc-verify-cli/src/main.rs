//! idc-verify -- module test runner for the Identity Center reporting module.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use idc_verify_core::config::IdcVerifyConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        config: config_path,
        log_level,
        output,
        command,
    } = cli;

    // `config` reports load errors itself
    let mut config = match command {
        Commands::Config(_) => IdcVerifyConfig::default(),
        _ => IdcVerifyConfig::load_or_default(&config_path)?,
    };
    if let Some(level) = log_level {
        config.general.log_level = level;
    }
    logging::init_tracing(&config.general).map_err(|e| CliError::Config(e.to_string()))?;

    tracing::debug!(config = %config_path.display(), "idc-verify starting");

    let writer = OutputWriter::new(output);
    match command {
        Commands::Run(args) => commands::run::execute(args, &config, &writer),
        Commands::Outputs(args) => commands::outputs::execute(args, &config, &writer),
        Commands::Destroy(args) => commands::destroy::execute(args, &config, &writer),
        Commands::Config(args) => commands::config::execute(args, &config_path, &writer),
        Commands::Report(args) => commands::report::execute(args, &config, &writer),
    }
}
