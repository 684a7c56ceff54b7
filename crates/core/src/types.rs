//! 도메인 타입 -- 실행 옵션과 output 값

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::TerraformConfig;

/// 프로비저닝 도구 호출 옵션
///
/// 실행 시작 시 한 번 만들어지고 apply / output / destroy 호출마다
/// 그대로 재사용됩니다. 생성 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOptions {
    /// 적용할 인프라 정의 디렉토리
    pub terraform_dir: PathBuf,
    /// state lock 사용 여부
    pub lock: bool,
    /// 컬러 출력 여부 (false면 `-no-color`)
    pub color: bool,
    /// `-var key=value` 로 전달할 변수
    pub vars: BTreeMap<String, String>,
    /// `-var-file` 로 전달할 파일 목록
    pub var_files: Vec<PathBuf>,
    /// 도구 프로세스에 추가할 환경변수
    pub env: BTreeMap<String, String>,
    /// 재시도 가능한 에러일 때 최대 재시도 횟수
    pub max_retries: u32,
    /// 재시도 간격
    pub time_between_retries: Duration,
    /// 재시도 가능한 에러 패턴 (정규식)
    pub retryable_errors: Vec<String>,
}

impl RunOptions {
    /// 기본값(lock=true, color=false, 재시도 없음)으로 옵션을 생성합니다.
    pub fn new(terraform_dir: impl Into<PathBuf>) -> Self {
        Self {
            terraform_dir: terraform_dir.into(),
            lock: true,
            color: false,
            vars: BTreeMap::new(),
            var_files: Vec::new(),
            env: BTreeMap::new(),
            max_retries: 0,
            time_between_retries: Duration::ZERO,
            retryable_errors: Vec::new(),
        }
    }

    /// `[terraform]` 설정 섹션에서 옵션을 생성합니다.
    pub fn from_config(config: &TerraformConfig) -> Self {
        Self {
            terraform_dir: PathBuf::from(&config.dir),
            lock: config.lock,
            color: config.color,
            vars: config.vars.clone(),
            var_files: config.var_files.iter().map(PathBuf::from).collect(),
            env: config.env.clone(),
            max_retries: config.max_retries,
            time_between_retries: Duration::from_secs(config.time_between_retries_secs),
            retryable_errors: config.retryable_errors.clone(),
        }
    }

    /// 대상 디렉토리만 바꾼 복사본을 반환합니다.
    pub fn with_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.terraform_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_retries(mut self, max_retries: u32, between: Duration) -> Self {
        self.max_retries = max_retries;
        self.time_between_retries = between;
        self
    }
}

/// 단일 output 값
///
/// 문자열 또는 문자열→문자열 맵(구조화된 output) 중 하나입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    /// 문자열 output (bool/number 는 리터럴 텍스트로 표현)
    Text(String),
    /// 구조화된 output
    Map(BTreeMap<String, String>),
}

impl OutputValue {
    /// 문자열 output 이면 그 값을 반환합니다.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Map(_) => None,
        }
    }

    /// 맵 output 이면 그 맵을 반환합니다.
    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Text(_) => None,
            Self::Map(map) => Some(map),
        }
    }
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// apply 이후 도구가 노출한 output 전체
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSet(BTreeMap<String, OutputValue>);

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: OutputValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OutputValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, OutputValue)> for OutputSet {
    fn from_iter<I: IntoIterator<Item = (String, OutputValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
