//! IAM Identity Center 할당 리포트
//!
//! 권한 세트 할당 스냅샷과 사용자/그룹 디렉토리 스냅샷을 계정 중심 리포트로
//! 변환하고 CSV로 렌더링합니다.
//!
//! # 모듈 구조
//!
//! - [`model`]: 입력 스냅샷 및 리포트 타입
//! - [`directory`]: `IdentityDirectory` 트레이트와 스냅샷 기반 구현
//! - [`transform`]: 할당 → 리포트 변환
//! - [`render`]: CSV 렌더링 (`csv`, `chrono`)
//! - [`handler`]: 환경 검사와 `statusCode` 응답

pub mod directory;
pub mod handler;
pub mod model;
pub mod render;
pub mod transform;

// --- Public API Re-exports ---

pub use directory::{IdentityDirectory, InMemoryDirectory};
pub use handler::{HandlerEnv, HandlerOutcome, ReportResponse, handle};
pub use model::{AssignmentReport, AssignmentSnapshot, DirectorySnapshot, GroupInfo, UserInfo};
pub use render::{CsvReport, render, render_at};
pub use transform::transform;
