//! 설정 관리 -- idc-verify.toml 파싱 및 런타임 설정
//!
//! [`IdcVerifyConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`IDC_VERIFY_TERRAFORM_DIR=../examples/complete` 형식)
//! 3. 설정 파일 (`idc-verify.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), idc_verify_core::error::IdcVerifyError> {
//! use idc_verify_core::config::IdcVerifyConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = IdcVerifyConfig::load("idc-verify.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = IdcVerifyConfig::parse("[verify]\nsettle_secs = 0")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, IdcVerifyError};

/// idc-verify 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdcVerifyConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 프로비저닝 도구 설정
    #[serde(default)]
    pub terraform: TerraformConfig,
    /// 검증 설정
    #[serde(default)]
    pub verify: VerifyConfig,
    /// 할당 리포트 설정
    #[serde(default)]
    pub report: ReportConfig,
}

impl IdcVerifyConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IdcVerifyError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값으로 시작하는 [`load`](Self::load) 변형입니다.
    ///
    /// `run` 명령은 설정 파일 없이도 기본 옵션으로 동작해야 합니다.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, IdcVerifyError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 파싱합니다 (환경변수 오버라이드, 검증 없음).
    ///
    /// 검증은 오버라이드가 적용된 뒤 [`load`](Self::load)에서 한 번만 수행합니다.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, IdcVerifyError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IdcVerifyError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                IdcVerifyError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, IdcVerifyError> {
        toml::from_str(toml_str).map_err(|e| {
            IdcVerifyError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `IDC_VERIFY_{SECTION}_{FIELD}`
    /// 예: `IDC_VERIFY_TERRAFORM_DIR=examples/complete`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "IDC_VERIFY_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "IDC_VERIFY_GENERAL_LOG_FORMAT");

        // Terraform
        override_string(&mut self.terraform.binary, "IDC_VERIFY_TERRAFORM_BINARY");
        override_string(&mut self.terraform.dir, "IDC_VERIFY_TERRAFORM_DIR");
        override_bool(&mut self.terraform.lock, "IDC_VERIFY_TERRAFORM_LOCK");
        override_bool(&mut self.terraform.color, "IDC_VERIFY_TERRAFORM_COLOR");
        override_csv(
            &mut self.terraform.var_files,
            "IDC_VERIFY_TERRAFORM_VAR_FILES",
        );
        override_u32(
            &mut self.terraform.max_retries,
            "IDC_VERIFY_TERRAFORM_MAX_RETRIES",
        );
        override_u64(
            &mut self.terraform.time_between_retries_secs,
            "IDC_VERIFY_TERRAFORM_TIME_BETWEEN_RETRIES_SECS",
        );

        // Verify
        override_u64(&mut self.verify.settle_secs, "IDC_VERIFY_VERIFY_SETTLE_SECS");

        // Report
        override_string(&mut self.report.output_dir, "IDC_VERIFY_REPORT_OUTPUT_DIR");
        override_string(&mut self.report.folder_name, "IDC_VERIFY_REPORT_FOLDER_NAME");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IdcVerifyError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.terraform.binary.trim().is_empty() {
            return Err(invalid("terraform.binary", "must not be empty"));
        }

        if self.terraform.dir.trim().is_empty() {
            return Err(invalid("terraform.dir", "must not be empty"));
        }

        for pattern in &self.terraform.retryable_errors {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(invalid(
                    "terraform.retryable_errors",
                    format!("invalid pattern '{pattern}': {e}"),
                ));
            }
        }

        if self.verify.expectations.is_empty() {
            return Err(invalid(
                "verify.expectations",
                "at least one expectation is required",
            ));
        }

        for (idx, expectation) in self.verify.expectations.iter().enumerate() {
            if expectation.output.trim().is_empty() {
                return Err(invalid(
                    &format!("verify.expectations[{idx}].output"),
                    "output name must not be empty",
                ));
            }
            if expectation.key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                return Err(invalid(
                    &format!("verify.expectations[{idx}].key"),
                    "key must not be empty when set",
                ));
            }
        }

        if self.report.folder_name.trim().is_empty() {
            return Err(invalid("report.folder_name", "must not be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> IdcVerifyError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 프로비저닝 도구 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerraformConfig {
    /// 실행할 terraform 바이너리
    pub binary: String,
    /// 적용할 인프라 정의 디렉토리
    pub dir: String,
    /// state lock 사용 여부
    pub lock: bool,
    /// 컬러 출력 여부
    pub color: bool,
    /// `-var` 변수
    pub vars: BTreeMap<String, String>,
    /// `-var-file` 목록
    pub var_files: Vec<String>,
    /// 추가 환경변수
    pub env: BTreeMap<String, String>,
    /// 재시도 가능한 에러의 최대 재시도 횟수 (0 = 재시도 없음)
    pub max_retries: u32,
    /// 재시도 간격 (초)
    pub time_between_retries_secs: u64,
    /// 재시도 가능한 에러 패턴 (정규식)
    pub retryable_errors: Vec<String>,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary: "terraform".to_owned(),
            dir: "../../examples/complete".to_owned(),
            lock: true,
            color: false,
            vars: BTreeMap::new(),
            var_files: Vec::new(),
            env: BTreeMap::new(),
            max_retries: 0,
            time_between_retries_secs: 5,
            retryable_errors: default_retryable_errors(),
        }
    }
}

/// 일시적인 네트워크/백엔드 에러 패턴
fn default_retryable_errors() -> Vec<String> {
    [
        r".*read: connection reset by peer.*",
        r".*TLS handshake timeout.*",
        r"(?s).*Failed to load state.*tcp.*timeout.*",
        r"(?s).*Error installing provider.*tcp.*timeout.*",
        r"(?s).*Error acquiring the state lock.*",
        r"(?s).*Client\.Timeout exceeded while awaiting headers.*",
        r"(?s).*Could not download module.*The requested URL returned error: 429.*",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect()
}

/// 검증 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// primary destroy 이후 대기 시간 (초)
    pub settle_secs: u64,
    /// output 기대값 목록
    pub expectations: Vec<ExpectationConfig>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            settle_secs: 10,
            expectations: vec![
                ExpectationConfig {
                    output: "test_success_1".to_owned(),
                    key: None,
                    expected: "true".to_owned(),
                    message: "The test_success_1 output is not true".to_owned(),
                },
                ExpectationConfig {
                    output: "test_success_2".to_owned(),
                    key: None,
                    expected: "true".to_owned(),
                    message: "The test_success_2 output is not true".to_owned(),
                },
                ExpectationConfig {
                    output: "idc_report".to_owned(),
                    key: Some("statusCode".to_owned()),
                    expected: "200".to_owned(),
                    message: "Expected statusCode to be 200".to_owned(),
                },
            ],
        }
    }
}

/// 단일 output 기대값
///
/// `key`가 있으면 output 을 맵으로 읽고 해당 필드를 비교합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectationConfig {
    /// output 이름
    pub output: String,
    /// 구조화된 output 의 필드명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// 기대하는 리터럴 문자열
    pub expected: String,
    /// 불일치 시 메시지
    #[serde(default)]
    pub message: String,
}

/// 할당 리포트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 리포트 출력 기준 디렉토리
    pub output_dir: String,
    /// 리포트 파일이 놓일 하위 폴더명
    pub folder_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_owned(),
            folder_name: "idc-reports".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
