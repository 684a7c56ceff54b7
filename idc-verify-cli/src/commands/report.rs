//! `idc-verify report` command handler

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use idc_verify_core::config::IdcVerifyConfig;
use idc_verify_report::{
    AssignmentSnapshot, DirectorySnapshot, HandlerEnv, InMemoryDirectory, handle,
};

use crate::cli::ReportArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `report` command.
///
/// Runs the assignment report handler over local snapshots. A 500 response
/// (missing `AWS_REGION` / `CRAWLER_ARN`) is rendered and then reported as
/// a command error.
pub fn execute(
    args: ReportArgs,
    config: &IdcVerifyConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let snapshot = AssignmentSnapshot::from_path(&args.assignments)?;
    let directory: InMemoryDirectory = DirectorySnapshot::from_path(&args.directory)?.into();
    let out_dir = args.out.unwrap_or_else(|| {
        PathBuf::from(&config.report.output_dir).join(&config.report.folder_name)
    });

    info!(
        assignments = %args.assignments.display(),
        users = directory.user_count(),
        groups = directory.group_count(),
        out = %out_dir.display(),
        "building assignment report"
    );

    let outcome = handle(&HandlerEnv::from_env(), &snapshot, &directory, Some(&out_dir))?;
    let summary = ReportSummary {
        status_code: outcome.response.status_code,
        files: outcome
            .written
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        body: serde_json::from_str(&outcome.response.body)?,
    };
    writer.render(&summary)?;

    if !outcome.response.is_success() {
        return Err(CliError::Command(format!(
            "report handler returned status {}",
            outcome.response.status_code
        )));
    }
    Ok(())
}

/// Report command result.
#[derive(Serialize)]
pub struct ReportSummary {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub files: Vec<String>,
    pub body: serde_json::Value,
}

impl Render for ReportSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let status = self.status_code.to_string();
        if self.status_code == 200 {
            writeln!(w, "Status: {}", status.green().bold())?;
        } else {
            writeln!(w, "Status: {}", status.red().bold())?;
            if let Some(error) = self.body.get("error").and_then(|e| e.as_str()) {
                writeln!(w, "  Error: {}", error.red())?;
            }
            return Ok(());
        }

        let count = |path: &[&str]| {
            path.iter()
                .try_fold(&self.body, |v, key| v.get(*key))
                .and_then(|v| v.as_object())
                .map_or(0, |o| o.len())
        };
        writeln!(w, "Accounts: {}", count(&["accounts"]))?;
        writeln!(w, "Users:    {}", count(&["principals", "users"]))?;
        writeln!(w, "Groups:   {}", count(&["principals", "groups"]))?;

        if !self.files.is_empty() {
            writeln!(w)?;
            writeln!(w, "Files:")?;
            for file in &self.files {
                writeln!(w, "  {}", file)?;
            }
        }
        Ok(())
    }
}
