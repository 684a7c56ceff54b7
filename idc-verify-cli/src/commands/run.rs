//! `idc-verify run` command handler

use std::io::Write;
use std::time::Duration;

use tracing::info;

use idc_verify_core::config::IdcVerifyConfig;
use idc_verify_runner::{RunReport, StepOutcome, TestRunner, Verdict};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// The report is always rendered, then the verdict is mapped to an error so
/// the process exit code reflects it.
pub fn execute(
    args: RunArgs,
    config: &IdcVerifyConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (provisioner, options) = super::terraform_target(config, args.dir.as_deref());
    let settle = Duration::from_secs(args.settle_secs.unwrap_or(config.verify.settle_secs));

    info!(
        dir = %options.terraform_dir.display(),
        settle_secs = settle.as_secs(),
        "running module test"
    );

    let runner = TestRunner::from_config(provisioner, config)
        .with_options(options)
        .with_settle(settle);
    let report = runner.run();

    writer.render(&report)?;

    match report.verdict() {
        Verdict::Passed => Ok(()),
        Verdict::AssertionsFailed => Err(CliError::AssertionsFailed {
            failed: report.assertions.failures().count(),
        }),
        Verdict::Aborted => Err(CliError::Provisioning(
            report.fatal.clone().unwrap_or_default(),
        )),
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Run {} ({})", self.run_id.to_string().bold(), self.terraform_dir)?;
        writeln!(w)?;

        writeln!(w, "Steps:")?;
        for step in &self.steps {
            let label = match &step.target {
                Some(target) => format!("{} {}", step.kind, target),
                None => step.kind.to_string(),
            };
            match &step.outcome {
                StepOutcome::Ok => writeln!(
                    w,
                    "  {:<28} {} ({} ms)",
                    label,
                    "ok".green(),
                    step.elapsed_ms
                )?,
                StepOutcome::Failed(reason) => writeln!(
                    w,
                    "  {:<28} {} ({} ms): {}",
                    label,
                    "failed".red(),
                    step.elapsed_ms,
                    reason
                )?,
            }
        }

        if !self.assertions.is_empty() {
            writeln!(w)?;
            writeln!(w, "Assertions:")?;
            for record in self.assertions.records() {
                if record.passed {
                    writeln!(w, "  {} {} = {:?}", "PASS".green(), record.name, record.actual)?;
                } else {
                    writeln!(
                        w,
                        "  {} {}: {} (expected {:?}, got {:?})",
                        "FAIL".red().bold(),
                        record.name,
                        record.message,
                        record.expected,
                        record.actual
                    )?;
                }
            }
        }

        if let Some(fatal) = &self.fatal {
            writeln!(w)?;
            writeln!(w, "Fatal: {}", fatal.red())?;
        }

        writeln!(w)?;
        let verdict = self.verdict().to_string().to_uppercase();
        match self.verdict() {
            Verdict::Passed => writeln!(w, "Result: {}", verdict.green().bold())?,
            _ => writeln!(w, "Result: {}", verdict.red().bold())?,
        }

        Ok(())
    }
}
