//! Command handlers -- one module per subcommand

pub mod config;
pub mod destroy;
pub mod outputs;
pub mod report;
pub mod run;

use std::path::Path;

use idc_verify_core::config::IdcVerifyConfig;
use idc_verify_core::types::RunOptions;
use idc_verify_terraform::TerraformCli;

/// Builds the provisioner and run options, applying an optional directory override.
fn terraform_target(config: &IdcVerifyConfig, dir: Option<&Path>) -> (TerraformCli, RunOptions) {
    let mut options = RunOptions::from_config(&config.terraform);
    if let Some(dir) = dir {
        options = options.with_dir(dir);
    }
    (TerraformCli::new(&config.terraform.binary), options)
}
