//! Expected output values.

use std::fmt;

use idc_verify_core::config::{ExpectationConfig, VerifyConfig};
use idc_verify_core::types::RunOptions;
use idc_verify_terraform::{Provisioner, TerraformError};

/// One output that must equal a literal string after apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub output: String,
    /// When set, the output is read as a map and this field is compared.
    pub key: Option<String>,
    pub expected: String,
    pub message: String,
}

impl Expectation {
    /// Expects a plain string output.
    pub fn text(output: &str, expected: &str, message: &str) -> Self {
        Self {
            output: output.to_owned(),
            key: None,
            expected: expected.to_owned(),
            message: message.to_owned(),
        }
    }

    /// Expects one field of a structured output.
    pub fn field(output: &str, key: &str, expected: &str, message: &str) -> Self {
        Self {
            output: output.to_owned(),
            key: Some(key.to_owned()),
            expected: expected.to_owned(),
            message: message.to_owned(),
        }
    }

    /// Reads the actual value through `provisioner`.
    ///
    /// A field missing from a structured output reads as the empty string,
    /// so it fails the comparison instead of aborting the run.
    pub fn read<P: Provisioner + ?Sized>(
        &self,
        provisioner: &P,
        options: &RunOptions,
    ) -> Result<String, TerraformError> {
        match &self.key {
            None => provisioner.output(options, &self.output),
            Some(key) => {
                let map = provisioner.output_map(options, &self.output)?;
                Ok(map.get(key).cloned().unwrap_or_default())
            }
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}.{}", self.output, key),
            None => write!(f, "{}", self.output),
        }
    }
}

impl From<&ExpectationConfig> for Expectation {
    fn from(config: &ExpectationConfig) -> Self {
        let message = if config.message.is_empty() {
            match &config.key {
                Some(key) => format!("Expected {}.{} to be {}", config.output, key, config.expected),
                None => format!("Expected {} to be {}", config.output, config.expected),
            }
        } else {
            config.message.clone()
        };

        Self {
            output: config.output.clone(),
            key: config.key.clone(),
            expected: config.expected.clone(),
            message,
        }
    }
}

/// `test_success_1`, `test_success_2` and `idc_report.statusCode`.
pub fn default_expectations() -> Vec<Expectation> {
    VerifyConfig::default()
        .expectations
        .iter()
        .map(Expectation::from)
        .collect()
}
