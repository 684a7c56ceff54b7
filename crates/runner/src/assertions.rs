//! Non-fatal equality assertions.
//!
//! A failed assertion is recorded and logged; it never stops the run.

use serde::Serialize;
use tracing::{debug, error};

/// Outcome of one equality check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionRecord {
    /// What was checked, e.g. `idc_report.statusCode`.
    pub name: String,
    pub expected: String,
    pub actual: String,
    /// Message reported on mismatch.
    pub message: String,
    pub passed: bool,
}

/// Ordered log of assertion outcomes for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Assertions {
    records: Vec<AssertionRecord>,
}

impl Assertions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records whether `actual == expected` (exact string equality).
    ///
    /// Returns `true` when they match.
    pub fn equal(&mut self, name: &str, actual: &str, expected: &str, message: &str) -> bool {
        let passed = actual == expected;
        if passed {
            debug!(name, expected, "assertion passed");
        } else {
            error!(name, expected, actual, message, "assertion failed");
        }

        self.records.push(AssertionRecord {
            name: name.to_owned(),
            expected: expected.to_owned(),
            actual: actual.to_owned(),
            message: message.to_owned(),
            passed,
        });
        passed
    }

    pub fn records(&self) -> &[AssertionRecord] {
        &self.records
    }

    pub fn failures(&self) -> impl Iterator<Item = &AssertionRecord> {
        self.records.iter().filter(|r| !r.passed)
    }

    /// `true` when nothing was checked or every check passed.
    pub fn all_passed(&self) -> bool {
        self.records.iter().all(|r| r.passed)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
