//! Terraform 드라이버 에러 타입
//!
//! [`TerraformError`]는 terraform 프로세스 실행과 output 디코딩에서 발생하는
//! 모든 에러를 표현합니다. `From<TerraformError> for IdcVerifyError` 변환이
//! 구현되어 있어 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use idc_verify_core::error::{IdcVerifyError, ProvisionError};

/// Terraform 드라이버 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum TerraformError {
    /// 프로세스를 시작할 수 없음
    #[error("failed to spawn '{binary}': {reason}")]
    Spawn {
        /// 실행하려던 바이너리
        binary: String,
        /// 실패 사유
        reason: String,
    },

    /// 명령이 0이 아닌 종료 코드로 끝남
    #[error("terraform {subcommand} exited with {}: {}", exit_label(.exit_code), summary(.stderr))]
    CommandFailed {
        /// 서브커맨드 (init, apply, output, destroy)
        subcommand: String,
        /// 대상 output 이름 (`output <name>` 호출일 때)
        target: Option<String>,
        /// 종료 코드 (시그널로 종료되면 None)
        exit_code: Option<i32>,
        /// 표준 출력
        stdout: String,
        /// 표준 에러
        stderr: String,
    },

    /// output JSON 디코딩 실패
    #[error("failed to decode output '{name}': {reason}")]
    OutputDecode {
        /// output 이름
        name: String,
        /// 실패 사유
        reason: String,
    },

    /// 맵으로 읽으려던 output 이 JSON 객체가 아님
    #[error("output '{name}' is not a map")]
    NotAMap {
        /// output 이름
        name: String,
    },

    /// 재시도 패턴이 유효한 정규식이 아님
    #[error("invalid retryable error pattern '{pattern}': {reason}")]
    InvalidRetryPattern {
        /// 문제가 된 패턴
        pattern: String,
        /// 컴파일 실패 사유
        reason: String,
    },
}

impl TerraformError {
    /// 실패한 명령에 대상 output 이름을 붙입니다.
    pub fn with_target(mut self, name: &str) -> Self {
        if let Self::CommandFailed { target, .. } = &mut self {
            *target = Some(name.to_owned());
        }
        self
    }

    /// 재시도 패턴 매칭에 사용할 텍스트 (stdout + stderr)
    pub fn combined_output(&self) -> Option<String> {
        match self {
            Self::CommandFailed { stdout, stderr, .. } => Some(format!("{stdout}\n{stderr}")),
            _ => None,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_owned(), |c| format!("code {c}"))
}

/// stderr 의 마지막 비어있지 않은 줄
fn summary(stderr: &str) -> &str {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("(no stderr)")
}

impl From<TerraformError> for IdcVerifyError {
    fn from(err: TerraformError) -> Self {
        let provision = match &err {
            TerraformError::Spawn { .. } | TerraformError::InvalidRetryPattern { .. } => {
                ProvisionError::Unavailable(err.to_string())
            }
            TerraformError::CommandFailed {
                subcommand, target, ..
            } => match subcommand.as_str() {
                "destroy" => ProvisionError::Destroy(err.to_string()),
                "output" => ProvisionError::Output {
                    name: target.clone().unwrap_or_else(|| "(all)".to_owned()),
                    reason: err.to_string(),
                },
                _ => ProvisionError::Apply(err.to_string()),
            },
            TerraformError::OutputDecode { name, reason } => ProvisionError::Output {
                name: name.clone(),
                reason: reason.clone(),
            },
            TerraformError::NotAMap { name } => ProvisionError::Output {
                name: name.clone(),
                reason: "not a map".to_owned(),
            },
        };
        IdcVerifyError::Provision(provision)
    }
}
