//! 에러 타입 -- 도메인별 에러 정의

/// idc-verify 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum IdcVerifyError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 프로비저닝 도구 호출 에러
    #[error("provision error: {0}")]
    Provision(#[from] ProvisionError),

    /// 할당 리포트 생성 에러
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 프로비저닝 도구 호출 에러
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// init / apply 실패
    #[error("apply failed: {0}")]
    Apply(String),

    /// output 조회 실패
    #[error("failed to read output '{name}': {reason}")]
    Output { name: String, reason: String },

    /// destroy 실패
    #[error("destroy failed: {0}")]
    Destroy(String),

    /// 도구 실행 자체가 불가능함 (바이너리 없음 등)
    #[error("tool unavailable: {0}")]
    Unavailable(String),
}

/// 할당 리포트 에러
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// 입력 스냅샷 로딩/파싱 실패
    #[error("snapshot error: {path}: {reason}")]
    Snapshot { path: String, reason: String },

    /// CSV 렌더링 실패
    #[error("render failed: {0}")]
    Render(String),
}
