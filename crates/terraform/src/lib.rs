//! Terraform driver for idc-verify.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`TerraformError`)
//! - [`provisioner`]: The `Provisioner` trait and the `TerraformCli` implementation
//! - [`args`]: Per-subcommand argument construction
//! - [`output`]: `terraform output -json` decoding
//! - [`retry`]: Retryable error policy

pub mod args;
pub mod error;
pub mod output;
pub mod provisioner;
pub mod retry;

// --- Public API Re-exports ---

pub use error::TerraformError;
pub use provisioner::{Provisioner, TerraformCli};
pub use retry::RetryPolicy;
