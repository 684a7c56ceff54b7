//! Integration tests for the `idc-verify` binary.
//!
//! Each test writes a config pointing `terraform.binary` at a scripted fake
//! and checks the rendered output and exit code.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serial_test::serial;
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_idc-verify");

/// Healthy module: every output matches, destroy succeeds.
const HEALTHY: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_TF_LOG"
case "$1" in
  output)
    case "$4" in
      test_success_1|test_success_2) echo "true" ;;
      idc_report) echo '{"statusCode":200,"body":"{}"}' ;;
      "") echo '{"test_success_1":{"sensitive":false,"type":"bool","value":true}}' ;;
      *) echo "Error: Output not found" >&2; exit 1 ;;
    esac
    ;;
  *) echo "ok" ;;
esac
"#;

/// Module whose report lambda answered 500.
const STATUS_500: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_TF_LOG"
case "$1" in
  output)
    case "$4" in
      idc_report) echo '{"statusCode":500,"body":"{}"}' ;;
      *) echo "true" ;;
    esac
    ;;
  *) echo "ok" ;;
esac
"#;

/// Apply always fails.
const APPLY_FAILS: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_TF_LOG"
if [ "$1" = "apply" ]; then
  echo "Error: creating SSO permission set: AccessDenied" >&2
  exit 1
fi
echo "ok"
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(script: &str) -> Self {
        let dir = TempDir::new().expect("should create temp dir");
        let binary = dir.path().join("terraform");
        fs::write(&binary, script).expect("should write fake terraform");
        let mut perms = fs::metadata(&binary).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&binary, perms).expect("should chmod fake terraform");

        let config = format!(
            r#"
[general]
log_level = "warn"

[terraform]
binary = "{binary}"
dir = "{dir}"

[terraform.env]
FAKE_TF_LOG = "{log}"

[verify]
settle_secs = 0

[report]
output_dir = "{dir}"
"#,
            binary = binary.display(),
            dir = dir.path().display(),
            log = dir.path().join("calls.log").display(),
        );
        fs::write(dir.path().join("idc-verify.toml"), config).expect("should write config");

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> PathBuf {
        self.path().join("idc-verify.toml")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(BIN)
            .arg("--config")
            .arg(self.config())
            .args(args)
            .env_remove("RUST_LOG")
            .env_remove("AWS_REGION")
            .env_remove("CRAWLER_ARN")
            .output()
            .expect("should run idc-verify")
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
#[serial]
fn run_passes_against_healthy_module() {
    let ws = Workspace::new(HEALTHY);

    let output = ws.run(&["run", "--output", "json"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json report");
    assert!(report["fatal"].is_null());
    assert_eq!(report["verdict"], "passed");
    assert_eq!(report["assertions"].as_array().map(Vec::len), Some(3));

    let destroys = ws.calls().iter().filter(|c| c.starts_with("destroy")).count();
    assert_eq!(destroys, 2, "primary and deferred destroy");
}

#[test]
#[serial]
fn run_with_bad_status_code_exits_3() {
    let ws = Workspace::new(STATUS_500);

    let output = ws.run(&["run"]);

    assert_eq!(output.status.code(), Some(3));
    let text = stdout(&output);
    assert!(text.contains("Expected statusCode to be 200"));
    assert!(text.contains("\"500\""));
}

#[test]
#[serial]
fn run_with_failing_apply_exits_4_and_still_destroys() {
    let ws = Workspace::new(APPLY_FAILS);

    let output = ws.run(&["run"]);

    assert_eq!(output.status.code(), Some(4));
    let calls = ws.calls();
    assert!(calls.iter().all(|c| !c.starts_with("output")));
    assert_eq!(calls.iter().filter(|c| c.starts_with("destroy")).count(), 1);
}

#[test]
#[serial]
fn run_json_reports_failed_verdict() {
    let ws = Workspace::new(STATUS_500);

    let output = ws.run(&["run", "--output", "json"]);

    assert_eq!(output.status.code(), Some(3));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json report");
    assert_eq!(report["verdict"], "assertions-failed");
}

#[test]
#[serial]
fn unknown_log_level_is_rejected_before_running() {
    let ws = Workspace::new(HEALTHY);

    let output = ws.run(&["run", "--log-level", "verbose"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("verbose"));
    assert!(ws.calls().is_empty(), "terraform should not be invoked");
}

#[test]
#[serial]
fn outputs_lists_applied_outputs() {
    let ws = Workspace::new(HEALTHY);

    let output = ws.run(&["outputs"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("test_success_1"));
}

#[test]
#[serial]
fn destroy_reports_success() {
    let ws = Workspace::new(HEALTHY);

    let output = ws.run(&["destroy", "--output", "json"]);

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(report["destroyed"], true);
    assert_eq!(ws.calls(), ["destroy -auto-approve -input=false -lock=true -no-color"]);
}

#[test]
#[serial]
fn config_validate_rejects_invalid_file() {
    let ws = Workspace::new(HEALTHY);
    fs::write(ws.config(), "[general]\nlog_level = \"loud\"\n").expect("write config");

    let output = ws.run(&["config", "validate"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("INVALID"));
}

#[test]
#[serial]
fn config_show_prints_section() {
    let ws = Workspace::new(HEALTHY);

    let output = ws.run(&["config", "show", "--section", "verify"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("settle_secs = 0"));
}

#[test]
#[serial]
fn report_without_environment_is_misconfigured() {
    let ws = Workspace::new(HEALTHY);
    let assignments = ws.path().join("assignments.json");
    let directory = ws.path().join("directory.json");
    fs::write(&assignments, "{}").expect("write assignments");
    fs::write(&directory, "{}").expect("write directory");

    let output = ws.run(&[
        "report",
        "--assignments",
        &assignments.display().to_string(),
        "--directory",
        &directory.display().to_string(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Server misconfiguration"));
    assert!(!ws.path().join("idc-reports").exists());
}

#[test]
#[serial]
fn report_writes_csv_files() {
    let ws = Workspace::new(HEALTHY);
    let assignments = ws.path().join("assignments.json");
    let directory = ws.path().join("directory.json");
    fs::write(
        &assignments,
        r#"{"arn:ps": {"permissionset_details": {"name": "ro"},
            "accounts": [{"id": "111", "name": "a", "status": "ACTIVE",
                          "assignments": {"users": [], "groups": ["g-1"]}}]}}"#,
    )
    .expect("write assignments");
    fs::write(
        &directory,
        r#"{"groups": {"g-1": {"display_name": "admins", "assigned_users": ["u-1"]}}}"#,
    )
    .expect("write directory");

    let output = Command::new(BIN)
        .arg("--config")
        .arg(ws.config())
        .args(["report", "--output", "json", "--assignments"])
        .arg(&assignments)
        .arg("--directory")
        .arg(&directory)
        .env_remove("RUST_LOG")
        .env("AWS_REGION", "eu-central-1")
        .env("CRAWLER_ARN", "arn:aws:iam::111111111111:role/idc-crawler")
        .output()
        .expect("should run idc-verify");

    assert_eq!(output.status.code(), Some(0));
    let summary: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(summary["statusCode"], 200);
    assert_eq!(summary["files"].as_array().map(Vec::len), Some(3));
    let written = fs::read_dir(ws.path().join("idc-reports"))
        .expect("report folder")
        .count();
    assert_eq!(written, 3);
}
