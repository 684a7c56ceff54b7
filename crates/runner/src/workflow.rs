//! Apply → verify → destroy → wait workflow.
//!
//! ```text
//! run
//!  ├─ CleanupScope::new              (arms the deferred destroy)
//!  ├─ init + apply                   fatal on error
//!  ├─ read + assert each output      read error fatal, mismatch recorded
//!  ├─ destroy (primary)              failure logged only
//!  ├─ wait settle period
//!  └─ CleanupScope::release          deferred destroy, failure logged only
//! ```
//!
//! The deferred destroy runs on every exit path, including after the primary
//! destroy already succeeded.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use idc_verify_core::config::IdcVerifyConfig;
use idc_verify_core::types::RunOptions;
use idc_verify_terraform::{Provisioner, TerraformError};

use crate::cleanup::CleanupScope;
use crate::expectation::{Expectation, default_expectations};
use crate::report::{RunReport, StepKind, StepOutcome};

/// Default pause after the primary destroy.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(10);

/// Why a run stopped before completing verification.
#[derive(Debug, Error)]
pub enum RunAbort {
    #[error("failed to apply terraform: {0}")]
    Apply(#[source] TerraformError),

    #[error("failed to read output '{name}': {source}")]
    Output {
        name: String,
        #[source]
        source: TerraformError,
    },
}

/// Drives one module test run against a [`Provisioner`].
pub struct TestRunner<P: Provisioner> {
    provisioner: P,
    options: RunOptions,
    expectations: Vec<Expectation>,
    settle: Duration,
}

impl<P: Provisioner> TestRunner<P> {
    /// Runner with the default expectations and settle period.
    pub fn new(provisioner: P, options: RunOptions) -> Self {
        Self {
            provisioner,
            options,
            expectations: default_expectations(),
            settle: DEFAULT_SETTLE,
        }
    }

    pub fn from_config(provisioner: P, config: &IdcVerifyConfig) -> Self {
        Self {
            provisioner,
            options: RunOptions::from_config(&config.terraform),
            expectations: config.verify.expectations.iter().map(Expectation::from).collect(),
            settle: Duration::from_secs(config.verify.settle_secs),
        }
    }

    pub fn with_expectations(mut self, expectations: Vec<Expectation>) -> Self {
        self.expectations = expectations;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn provisioner(&self) -> &P {
        &self.provisioner
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Executes the whole workflow and returns what happened.
    ///
    /// Never fails: fatal conditions end up in [`RunReport::fatal`], assertion
    /// mismatches in [`RunReport::assertions`].
    pub fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id, dir = %self.options.terraform_dir.display());
        let _enter = span.enter();

        info!(expectations = self.expectations.len(), "starting module test run");

        let report = RunReport::new(run_id, &self.options.terraform_dir);
        let mut scope = CleanupScope::new(&self.provisioner, &self.options, report);

        if let Err(abort) = self.body(scope.report_mut()) {
            error!(error = %abort, "run aborted");
            scope.report_mut().abort(abort.to_string());
        }

        let report = scope.release();
        info!(
            verdict = %report.verdict(),
            failed_assertions = report.assertions.failures().count(),
            destroy_attempts = report.destroy_attempts(),
            "module test run finished"
        );
        report
    }

    fn body(&self, report: &mut RunReport) -> Result<(), RunAbort> {
        self.apply(report)?;
        self.verify(report)?;
        self.destroy_primary(report);
        self.wait(report);
        Ok(())
    }

    fn apply(&self, report: &mut RunReport) -> Result<(), RunAbort> {
        let started = Instant::now();
        match self.provisioner.init_and_apply(&self.options) {
            Ok(_) => {
                info!("apply complete");
                report.record_step(StepKind::Apply, None, StepOutcome::Ok, started.elapsed());
                Ok(())
            }
            Err(e) => {
                report.record_step(
                    StepKind::Apply,
                    None,
                    StepOutcome::Failed(e.to_string()),
                    started.elapsed(),
                );
                Err(RunAbort::Apply(e))
            }
        }
    }

    fn verify(&self, report: &mut RunReport) -> Result<(), RunAbort> {
        for expectation in &self.expectations {
            let started = Instant::now();
            let actual = match expectation.read(&self.provisioner, &self.options) {
                Ok(actual) => actual,
                Err(e) => {
                    report.record_step(
                        StepKind::Output,
                        Some(&expectation.output),
                        StepOutcome::Failed(e.to_string()),
                        started.elapsed(),
                    );
                    return Err(RunAbort::Output {
                        name: expectation.output.clone(),
                        source: e,
                    });
                }
            };
            report.record_step(
                StepKind::Output,
                Some(&expectation.output),
                StepOutcome::Ok,
                started.elapsed(),
            );

            report.assertions.equal(
                &expectation.to_string(),
                &actual,
                &expectation.expected,
                &expectation.message,
            );
        }
        Ok(())
    }

    fn destroy_primary(&self, report: &mut RunReport) {
        let started = Instant::now();
        let outcome = match self.provisioner.destroy(&self.options) {
            Ok(_) => {
                info!("primary destroy complete");
                StepOutcome::Ok
            }
            Err(e) => {
                warn!(error = %e, "error during terraform destroy");
                StepOutcome::Failed(e.to_string())
            }
        };
        report.record_step(StepKind::DestroyPrimary, None, outcome, started.elapsed());
    }

    fn wait(&self, report: &mut RunReport) {
        let started = Instant::now();
        info!(secs = self.settle.as_secs_f64(), "waiting before deferred destroy");
        std::thread::sleep(self.settle);
        report.record_step(StepKind::Wait, None, StepOutcome::Ok, started.elapsed());
    }
}
