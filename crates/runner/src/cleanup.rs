//! Deferred destroy guard.
//!
//! [`CleanupScope`] owns the run report for the duration of a run. Dropping
//! it (normal return, early return or unwinding panic) runs destroy exactly
//! once unless [`CleanupScope::release`] already did.

use std::time::Instant;

use tracing::{info, warn};

use idc_verify_core::types::RunOptions;
use idc_verify_terraform::Provisioner;

use crate::report::{RunReport, StepKind, StepOutcome};

pub struct CleanupScope<'a, P: Provisioner + ?Sized> {
    provisioner: &'a P,
    options: &'a RunOptions,
    report: RunReport,
    released: bool,
}

impl<'a, P: Provisioner + ?Sized> CleanupScope<'a, P> {
    pub fn new(provisioner: &'a P, options: &'a RunOptions, report: RunReport) -> Self {
        Self {
            provisioner,
            options,
            report,
            released: false,
        }
    }

    pub fn report_mut(&mut self) -> &mut RunReport {
        &mut self.report
    }

    /// Runs the deferred destroy now and hands back the report.
    pub fn release(mut self) -> RunReport {
        self.destroy_once();
        std::mem::take(&mut self.report)
    }

    fn destroy_once(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let started = Instant::now();
        let outcome = match self.provisioner.destroy(self.options) {
            Ok(_) => {
                info!("deferred destroy complete");
                StepOutcome::Ok
            }
            Err(e) => {
                warn!(error = %e, "error during deferred terraform destroy");
                StepOutcome::Failed(e.to_string())
            }
        };
        self.report
            .record_step(StepKind::DestroyDeferred, None, outcome, started.elapsed());
    }
}

impl<P: Provisioner + ?Sized> Drop for CleanupScope<'_, P> {
    fn drop(&mut self) {
        if !self.released {
            warn!("run scope exited without release, running deferred destroy");
            self.destroy_once();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use uuid::Uuid;

    use super::*;
    use crate::mock::{Call, MockProvisioner};

    #[test]
    fn release_destroys_once() {
        let mock = MockProvisioner::healthy();
        let options = RunOptions::new(".");
        let scope = CleanupScope::new(&mock, &options, RunReport::new(Uuid::new_v4(), &options.terraform_dir));

        let report = scope.release();

        assert_eq!(mock.calls(), [Call::Destroy]);
        assert_eq!(report.sequence(), [StepKind::DestroyDeferred]);
    }

    #[test]
    fn drop_without_release_destroys() {
        let mock = MockProvisioner::healthy();
        let options = RunOptions::new(".");
        {
            let _scope = CleanupScope::new(&mock, &options, RunReport::default());
        }
        assert_eq!(mock.destroy_count(), 1);
    }

    #[test]
    fn panic_inside_scope_still_destroys() {
        let mock = MockProvisioner::healthy();
        let options = RunOptions::new(".");

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _scope = CleanupScope::new(&mock, &options, RunReport::default());
            panic!("verification blew up");
        }));

        assert!(result.is_err());
        assert_eq!(mock.destroy_count(), 1);
    }

    #[test]
    fn failed_deferred_destroy_is_recorded() {
        let mock = MockProvisioner::healthy().failing_destroy();
        let options = RunOptions::new(".");
        let report = CleanupScope::new(&mock, &options, RunReport::default()).release();

        let step = &report.steps[0];
        assert_eq!(step.kind, StepKind::DestroyDeferred);
        assert!(!step.outcome.is_ok());
        assert!(report.passed());
    }
}
