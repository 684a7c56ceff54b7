//! Run report: what each step did and how the run ended.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::assertions::Assertions;

/// Workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    Apply,
    Output,
    DestroyPrimary,
    Wait,
    DestroyDeferred,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::Output => "output",
            Self::DestroyPrimary => "destroy-primary",
            Self::Wait => "wait",
            Self::DestroyDeferred => "destroy-deferred",
        }
    }

    pub fn is_destroy(self) -> bool {
        matches!(self, Self::DestroyPrimary | Self::DestroyDeferred)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum StepOutcome {
    Ok,
    Failed(String),
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub kind: StepKind,
    /// Output name for [`StepKind::Output`] steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
}

/// Overall result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Passed,
    AssertionsFailed,
    /// Apply or an output read failed; verification did not complete.
    Aborted,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::AssertionsFailed => write!(f, "assertions failed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Everything one run observed.
///
/// Destroy failures are recorded as failed steps but never change the verdict.
/// The serialized form carries the computed `verdict` next to the raw fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub terraform_dir: String,
    pub steps: Vec<StepRecord>,
    pub assertions: Assertions,
    /// Reason the run stopped early, if it did.
    pub fatal: Option<String>,
}

impl RunReport {
    pub fn new(run_id: Uuid, terraform_dir: &Path) -> Self {
        Self {
            run_id,
            terraform_dir: terraform_dir.display().to_string(),
            ..Self::default()
        }
    }

    pub fn record_step(
        &mut self,
        kind: StepKind,
        target: Option<&str>,
        outcome: StepOutcome,
        elapsed: Duration,
    ) {
        self.steps.push(StepRecord {
            kind,
            target: target.map(str::to_owned),
            outcome,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        });
    }

    pub fn abort(&mut self, reason: impl Into<String>) {
        self.fatal = Some(reason.into());
    }

    pub fn verdict(&self) -> Verdict {
        if self.fatal.is_some() {
            Verdict::Aborted
        } else if self.assertions.all_passed() {
            Verdict::Passed
        } else {
            Verdict::AssertionsFailed
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict() == Verdict::Passed
    }

    pub fn steps_of(&self, kind: StepKind) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(move |s| s.kind == kind)
    }

    pub fn destroy_attempts(&self) -> usize {
        self.steps.iter().filter(|s| s.kind.is_destroy()).count()
    }

    /// Step kinds in execution order.
    pub fn sequence(&self) -> Vec<StepKind> {
        self.steps.iter().map(|s| s.kind).collect()
    }
}

impl Serialize for RunReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RunReport", 6)?;
        state.serialize_field("run_id", &self.run_id)?;
        state.serialize_field("terraform_dir", &self.terraform_dir)?;
        state.serialize_field("verdict", &self.verdict())?;
        state.serialize_field("steps", &self.steps)?;
        state.serialize_field("assertions", &self.assertions)?;
        state.serialize_field("fatal", &self.fatal)?;
        state.end()
    }
}
