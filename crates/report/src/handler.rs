//! 리포트 핸들러 -- 환경 검사, 변환, 렌더링, 응답 생성
//!
//! 응답 형식은 배포된 리포팅 함수의 `idc_report` 출력과 같습니다.
//!
//! ```json
//! { "statusCode": 200, "body": "{\"accounts\": {...}, \"principals\": {...}}" }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use idc_verify_core::error::ReportError;

use crate::directory::IdentityDirectory;
use crate::model::AssignmentSnapshot;
use crate::render;
use crate::transform::transform;

/// 리전 환경변수
pub const ENV_REGION: &str = "AWS_REGION";
/// 크롤러 역할 ARN 환경변수
pub const ENV_CRAWLER_ARN: &str = "CRAWLER_ARN";

/// 핸들러 실행에 필요한 환경
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerEnv {
    pub region: Option<String>,
    pub crawler_arn: Option<String>,
}

impl HandlerEnv {
    /// 프로세스 환경변수에서 읽습니다.
    pub fn from_env() -> Self {
        Self {
            region: std::env::var(ENV_REGION).ok(),
            crawler_arn: std::env::var(ENV_CRAWLER_ARN).ok(),
        }
    }

    /// 두 값이 모두 비어 있지 않은지 확인합니다.
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.region) && present(&self.crawler_arn)
    }
}

/// 핸들러 응답
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON 인코딩된 본문
    pub body: String,
}

impl ReportResponse {
    /// 필수 환경 누락 응답 (500)
    pub fn misconfigured() -> Self {
        Self {
            status_code: 500,
            body: serde_json::json!({ "error": "Server misconfiguration" }).to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// 핸들러 실행 결과
#[derive(Debug, Clone)]
pub struct HandlerOutcome {
    pub response: ReportResponse,
    /// 기록된 CSV 경로 (출력 디렉토리가 없으면 비어 있음)
    pub written: Vec<PathBuf>,
}

/// 할당 리포트를 생성합니다.
///
/// 필수 환경이 없으면 에러가 아니라 500 응답을 반환합니다.
/// `output_dir`이 `None`이면 CSV를 렌더링만 하고 기록하지 않습니다.
///
/// # Errors
///
/// CSV 렌더링이나 파일 기록 실패
pub fn handle(
    env: &HandlerEnv,
    snapshot: &AssignmentSnapshot,
    directory: &dyn IdentityDirectory,
    output_dir: Option<&Path>,
) -> Result<HandlerOutcome, ReportError> {
    if !env.is_complete() {
        error!(
            "missing required environment variables: {} and/or {}",
            ENV_REGION, ENV_CRAWLER_ARN
        );
        return Ok(HandlerOutcome {
            response: ReportResponse::misconfigured(),
            written: Vec::new(),
        });
    }

    debug!(
        permission_sets = snapshot.permission_sets.len(),
        region = env.region.as_deref().unwrap_or_default(),
        "building assignment report"
    );
    let report = transform(snapshot, directory);
    let csv = render::render(&report)?;

    let written = match output_dir {
        Some(dir) => csv.write_to(dir)?,
        None => {
            info!("no output directory provided, skipping CSV files");
            Vec::new()
        }
    };

    let body = serde_json::to_string(&report).map_err(|e| ReportError::Render(e.to_string()))?;
    Ok(HandlerOutcome {
        response: ReportResponse {
            status_code: 200,
            body,
        },
        written,
    })
}
