//! `idc-verify destroy` command handler

use std::io::Write;

use serde::Serialize;
use tracing::{info, warn};

use idc_verify_core::config::IdcVerifyConfig;
use idc_verify_terraform::Provisioner;

use crate::cli::TargetArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `destroy` command.
///
/// Manual cleanup for a run that was interrupted before its deferred destroy.
/// Unlike the destroy steps inside `run`, a failure here is an error.
pub fn execute(
    args: TargetArgs,
    config: &IdcVerifyConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (provisioner, options) = super::terraform_target(config, args.dir.as_deref());
    info!(dir = %options.terraform_dir.display(), "destroying configuration");

    let result = provisioner.destroy(&options);
    let report = DestroyReport {
        terraform_dir: options.terraform_dir.display().to_string(),
        destroyed: result.is_ok(),
        error: result.as_ref().err().map(ToString::to_string),
    };
    writer.render(&report)?;

    if let Err(e) = result {
        warn!(error = %e, "destroy failed");
        return Err(e.into());
    }
    Ok(())
}

/// Destroy result.
#[derive(Serialize)]
pub struct DestroyReport {
    pub terraform_dir: String,
    pub destroyed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Render for DestroyReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Destroy: {}", self.terraform_dir.bold())?;
        if self.destroyed {
            writeln!(w, "  Result: {}", "DESTROYED".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "FAILED".red().bold())?;
            if let Some(ref error) = self.error {
                writeln!(w, "  Error: {}", error.red())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroy_report_render_text_failed() {
        colored::control::set_override(false);
        let report = DestroyReport {
            terraform_dir: "examples/complete".to_owned(),
            destroyed: false,
            error: Some("terraform destroy exited with 1: BucketNotEmpty".to_owned()),
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Destroy: examples/complete"));
        assert!(output.contains("FAILED"));
        assert!(output.contains("BucketNotEmpty"));
    }

    #[test]
    fn test_destroy_report_json_omits_missing_error() {
        let report = DestroyReport {
            terraform_dir: ".".to_owned(),
            destroyed: true,
            error: None,
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["destroyed"], true);
        assert!(json.get("error").is_none());
    }
}
