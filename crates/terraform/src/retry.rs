//! Retry policy for transient terraform failures.

use std::time::Duration;

use regex::Regex;

use idc_verify_core::types::RunOptions;

use crate::error::TerraformError;

/// Compiled form of the retry settings in [`RunOptions`].
#[derive(Debug)]
pub struct RetryPolicy {
    max_retries: u32,
    between: Duration,
    patterns: Vec<Regex>,
}

impl RetryPolicy {
    /// Compiles the retryable error patterns of `options`.
    pub fn from_options(options: &RunOptions) -> Result<Self, TerraformError> {
        let patterns = options
            .retryable_errors
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| TerraformError::InvalidRetryPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            max_retries: options.max_retries,
            between: options.time_between_retries,
            patterns,
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn between(&self) -> Duration {
        self.between
    }

    /// Returns the pattern that makes `err` retryable, if any.
    pub fn retryable(&self, err: &TerraformError) -> Option<&str> {
        let text = err.combined_output()?;
        self.patterns
            .iter()
            .find(|re| re.is_match(&text))
            .map(Regex::as_str)
    }
}
