//! CLI-specific error types and exit code mapping

use idc_verify_core::error::IdcVerifyError;
use idc_verify_terraform::TerraformError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The run completed but recorded assertion mismatches.
    #[error("{failed} assertion(s) failed")]
    AssertionsFailed { failed: usize },

    /// Apply, output read or destroy failed.
    #[error("provisioning failed: {0}")]
    Provisioning(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from idc-verify-core.
    #[error("{0}")]
    Core(IdcVerifyError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                |
    /// |------|----------------------------------------|
    /// | 0    | Success                                |
    /// | 1    | General / command error                |
    /// | 2    | Configuration error                    |
    /// | 3    | Assertion failures recorded            |
    /// | 4    | Fatal provisioning failure             |
    /// | 10   | IO error                               |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(IdcVerifyError::Config(_)) => 2,
            Self::AssertionsFailed { .. } => 3,
            Self::Provisioning(_) | Self::Core(IdcVerifyError::Provision(_)) => 4,
            Self::Io(_) | Self::Core(IdcVerifyError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<IdcVerifyError> for CliError {
    fn from(e: IdcVerifyError) -> Self {
        Self::Core(e)
    }
}

impl From<TerraformError> for CliError {
    fn from(e: TerraformError) -> Self {
        Self::Core(e.into())
    }
}

impl From<idc_verify_core::error::ReportError> for CliError {
    fn from(e: idc_verify_core::error::ReportError) -> Self {
        Self::Core(e.into())
    }
}
