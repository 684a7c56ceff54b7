//! `idc-verify outputs` command handler

use std::io::Write;

use tracing::info;

use idc_verify_core::config::IdcVerifyConfig;
use idc_verify_core::types::OutputSet;
use idc_verify_terraform::Provisioner;

use crate::cli::TargetArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `outputs` command.
///
/// Reads every output of an already applied configuration.
pub fn execute(
    args: TargetArgs,
    config: &IdcVerifyConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (provisioner, options) = super::terraform_target(config, args.dir.as_deref());
    info!(dir = %options.terraform_dir.display(), "reading outputs");

    let outputs = provisioner.output_all(&options)?;
    writer.render(&outputs)?;
    Ok(())
}

impl Render for OutputSet {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.is_empty() {
            writeln!(w, "No outputs.")?;
            return Ok(());
        }

        let width = self.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, value) in self.iter() {
            writeln!(w, "{:<width$} = {}", name.bold(), value, width = width)?;
        }
        Ok(())
    }
}
