//! Provisioning tool abstraction for testability.
//!
//! The [`Provisioner`] trait is the whole surface the test runner needs from
//! the infrastructure-as-code tool. Production code uses [`TerraformCli`],
//! which shells out to the `terraform` binary; workflow tests substitute a
//! recording mock.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐
//! │ TestRunner │
//! └─────┬──────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │ Provisioner │ (trait)
//! └─────────────┘
//!    │       │
//!    ▼       ▼
//! ┌──────────────┐ ┌──────┐
//! │ TerraformCli │ │ Mock │
//! └──────┬───────┘ └──────┘
//!        │
//!        ▼
//!   terraform binary
//! ```
//!
//! # Execution model
//!
//! Every call blocks until the child process exits. Calls are never issued
//! concurrently against the same working directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use idc_verify_core::types::{OutputSet, RunOptions};

use crate::args;
use crate::error::TerraformError;
use crate::output;
use crate::retry::RetryPolicy;

/// Operations consumed from the provisioning tool.
///
/// `options` is passed to every call; implementations must not cache state
/// between calls beyond what the tool itself persists.
pub trait Provisioner: Send + Sync {
    /// Runs init followed by apply. Returns the apply stdout.
    ///
    /// # Errors
    ///
    /// Any init or apply failure that survives the retry policy.
    fn init_and_apply(&self, options: &RunOptions) -> Result<String, TerraformError>;

    /// Reads a single output as a string.
    fn output(&self, options: &RunOptions, name: &str) -> Result<String, TerraformError>;

    /// Reads a structured output as a flat string map.
    ///
    /// # Errors
    ///
    /// `TerraformError::NotAMap` when the output is not an object.
    fn output_map(
        &self,
        options: &RunOptions,
        name: &str,
    ) -> Result<BTreeMap<String, String>, TerraformError>;

    /// Reads every output of the configuration.
    fn output_all(&self, options: &RunOptions) -> Result<OutputSet, TerraformError>;

    /// Destroys everything the configuration manages. Returns the destroy stdout.
    fn destroy(&self, options: &RunOptions) -> Result<String, TerraformError>;
}

/// [`Provisioner`] backed by the `terraform` command line.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    binary: PathBuf,
}

impl TerraformCli {
    /// Uses `binary` (a name on `PATH` or an explicit path).
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Runs `args` with the retry policy of `options`.
    fn run(&self, options: &RunOptions, args: &[String]) -> Result<String, TerraformError> {
        let policy = RetryPolicy::from_options(options)?;
        let mut attempt: u32 = 0;

        loop {
            match self.run_once(options, args) {
                Ok(stdout) => return Ok(stdout),
                Err(err) => {
                    if attempt >= policy.max_retries() {
                        return Err(err);
                    }
                    let Some(pattern) = policy.retryable(&err) else {
                        return Err(err);
                    };
                    attempt += 1;
                    warn!(
                        subcommand = args.first().map(String::as_str).unwrap_or_default(),
                        attempt,
                        max_retries = policy.max_retries(),
                        pattern,
                        error = %err,
                        "retryable terraform error, retrying"
                    );
                    std::thread::sleep(policy.between());
                }
            }
        }
    }

    fn run_once(&self, options: &RunOptions, args: &[String]) -> Result<String, TerraformError> {
        let subcommand = args.first().cloned().unwrap_or_default();
        debug!(
            binary = %self.binary.display(),
            dir = %options.terraform_dir.display(),
            args = ?args,
            "running terraform"
        );

        let out = Command::new(&self.binary)
            .args(args)
            .current_dir(&options.terraform_dir)
            .envs(&options.env)
            .output()
            .map_err(|e| TerraformError::Spawn {
                binary: self.binary.display().to_string(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
        if out.status.success() {
            return Ok(stdout);
        }

        Err(TerraformError::CommandFailed {
            subcommand,
            target: None,
            exit_code: out.status.code(),
            stdout,
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}

impl Default for TerraformCli {
    fn default() -> Self {
        Self::new("terraform")
    }
}

impl Provisioner for TerraformCli {
    fn init_and_apply(&self, options: &RunOptions) -> Result<String, TerraformError> {
        info!(dir = %options.terraform_dir.display(), "terraform init");
        let mut stdout = self.run(options, &args::init_args(options))?;
        info!(dir = %options.terraform_dir.display(), "terraform apply");
        stdout.push_str(&self.run(options, &args::apply_args(options))?);
        Ok(stdout)
    }

    fn output(&self, options: &RunOptions, name: &str) -> Result<String, TerraformError> {
        let raw = self
            .run(options, &args::output_args(Some(name)))
            .map_err(|e| e.with_target(name))?;
        output::decode_text(name, &raw)
    }

    fn output_map(
        &self,
        options: &RunOptions,
        name: &str,
    ) -> Result<BTreeMap<String, String>, TerraformError> {
        let raw = self
            .run(options, &args::output_args(Some(name)))
            .map_err(|e| e.with_target(name))?;
        output::decode_map(name, &raw)
    }

    fn output_all(&self, options: &RunOptions) -> Result<OutputSet, TerraformError> {
        let raw = self.run(options, &args::output_args(None))?;
        output::decode_all(&raw)
    }

    fn destroy(&self, options: &RunOptions) -> Result<String, TerraformError> {
        info!(dir = %options.terraform_dir.display(), "terraform destroy");
        self.run(options, &args::destroy_args(options))
    }
}
