//! Module test workflow for idc-verify.
//!
//! # Module Structure
//!
//! - [`workflow`]: `TestRunner`, the apply → verify → destroy → wait sequence
//! - [`cleanup`]: `CleanupScope`, the deferred destroy guard
//! - [`expectation`]: Expected output values
//! - [`assertions`]: Non-fatal equality checks
//! - [`report`]: `RunReport` and step records

pub mod assertions;
pub mod cleanup;
pub mod expectation;
pub mod report;
pub mod workflow;

#[cfg(test)]
mod mock;

// --- Public API Re-exports ---

pub use assertions::{AssertionRecord, Assertions};
pub use cleanup::CleanupScope;
pub use expectation::{Expectation, default_expectations};
pub use report::{RunReport, StepKind, StepOutcome, StepRecord, Verdict};
pub use workflow::{DEFAULT_SETTLE, RunAbort, TestRunner};
