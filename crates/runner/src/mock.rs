//! Recording `Provisioner` for workflow tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use idc_verify_core::types::{OutputSet, OutputValue, RunOptions};
use idc_verify_terraform::{Provisioner, TerraformError};

/// A provisioner call observed by [`MockProvisioner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Apply,
    Output(String),
    Destroy,
}

/// In-memory provisioner with scripted outputs and failures.
pub struct MockProvisioner {
    outputs: BTreeMap<String, OutputValue>,
    fail_apply: bool,
    fail_destroy: bool,
    fail_output: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl MockProvisioner {
    pub fn new() -> Self {
        Self {
            outputs: BTreeMap::new(),
            fail_apply: false,
            fail_destroy: false,
            fail_output: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Outputs of a module whose self-checks all pass.
    pub fn healthy() -> Self {
        let report = BTreeMap::from([
            ("statusCode".to_owned(), "200".to_owned()),
            ("body".to_owned(), r#"{"accounts":{}}"#.to_owned()),
        ]);
        Self::new()
            .with_text("test_success_1", "true")
            .with_text("test_success_2", "true")
            .with_map("idc_report", report)
    }

    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.outputs
            .insert(name.to_owned(), OutputValue::Text(value.to_owned()));
        self
    }

    pub fn with_map(mut self, name: &str, value: BTreeMap<String, String>) -> Self {
        self.outputs.insert(name.to_owned(), OutputValue::Map(value));
        self
    }

    pub fn failing_apply(mut self) -> Self {
        self.fail_apply = true;
        self
    }

    pub fn failing_destroy(mut self) -> Self {
        self.fail_destroy = true;
        self
    }

    pub fn failing_output(mut self, name: &str) -> Self {
        self.fail_output = Some(name.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn destroy_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Destroy).count()
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn failure(subcommand: &str, stderr: &str) -> TerraformError {
        TerraformError::CommandFailed {
            subcommand: subcommand.to_owned(),
            target: None,
            exit_code: Some(1),
            stdout: String::new(),
            stderr: stderr.to_owned(),
        }
    }

    fn lookup(&self, name: &str) -> Result<&OutputValue, TerraformError> {
        if self.fail_output.as_deref() == Some(name) {
            return Err(
                Self::failure("output", "Error: state snapshot was created by a newer version")
                    .with_target(name),
            );
        }
        self.outputs
            .get(name)
            .ok_or_else(|| {
                Self::failure("output", &format!("Error: Output \"{name}\" not found"))
                    .with_target(name)
            })
    }
}

impl Provisioner for MockProvisioner {
    fn init_and_apply(&self, _options: &RunOptions) -> Result<String, TerraformError> {
        self.record(Call::Apply);
        if self.fail_apply {
            return Err(Self::failure("apply", "Error: creating SSO permission set: AccessDenied"));
        }
        Ok("Apply complete!".to_owned())
    }

    fn output(&self, _options: &RunOptions, name: &str) -> Result<String, TerraformError> {
        self.record(Call::Output(name.to_owned()));
        Ok(self.lookup(name)?.to_string())
    }

    fn output_map(
        &self,
        _options: &RunOptions,
        name: &str,
    ) -> Result<BTreeMap<String, String>, TerraformError> {
        self.record(Call::Output(name.to_owned()));
        self.lookup(name)?
            .as_map()
            .cloned()
            .ok_or_else(|| TerraformError::NotAMap {
                name: name.to_owned(),
            })
    }

    fn output_all(&self, _options: &RunOptions) -> Result<OutputSet, TerraformError> {
        Ok(self
            .outputs
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn destroy(&self, _options: &RunOptions) -> Result<String, TerraformError> {
        self.record(Call::Destroy);
        if self.fail_destroy {
            return Err(Self::failure("destroy", "Error: deleting S3 bucket: BucketNotEmpty"));
        }
        Ok("Destroy complete!".to_owned())
    }
}
