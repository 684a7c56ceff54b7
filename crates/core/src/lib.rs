//! idc-verify 공통 크레이트
//!
//! 모든 크레이트가 공유하는 설정([`config`]), 에러([`error`]),
//! 도메인 타입([`types`])을 정의합니다.

pub mod config;
pub mod error;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, IdcVerifyError, ProvisionError, ReportError};

// 설정
pub use config::{ExpectationConfig, IdcVerifyConfig};

// 도메인 타입
pub use types::{OutputSet, OutputValue, RunOptions};
