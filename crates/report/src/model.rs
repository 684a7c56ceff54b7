//! 리포트 데이터 모델 -- 입력 스냅샷과 변환 결과
//!
//! # 입력 스냅샷
//!
//! 할당 스냅샷 (권한 세트 ARN → 상세 정보 + 계정별 할당):
//!
//! ```json
//! {
//!   "arn:aws:sso:::permissionSet/ssoins-1/ps-1": {
//!     "permissionset_details": { "name": "AdministratorAccess", "arn": "..." },
//!     "accounts": [
//!       {
//!         "id": "111111111111",
//!         "name": "core-security",
//!         "status": "ACTIVE",
//!         "assignments": { "users": ["u-1"], "groups": ["g-1"] }
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! 디렉토리 스냅샷 (사용자/그룹 ID → 표시 정보):
//!
//! ```json
//! {
//!   "users": { "u-1": { "user_name": "alice", "display_name": "Alice" } },
//!   "groups": {
//!     "g-1": {
//!       "display_name": "platform-admins",
//!       "assigned_users": ["u-2"],
//!       "external_ids": [{ "issuer": "https://idp.example", "id": "ext-1" }]
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use idc_verify_core::error::ReportError;

/// 스냅샷 파일 최대 크기 (50 MB)
const MAX_SNAPSHOT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// 알 수 없는 주체의 표시값
pub const NOT_AVAILABLE: &str = "n/a";

// --- 할당 스냅샷 ---

/// 권한 세트 상세 정보
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionSetDetails {
    /// 권한 세트 이름
    pub name: String,
    pub arn: String,
    pub description: String,
    /// 세션 지속 시간 (ISO 8601, 예: `PT8H`)
    pub session_duration: String,
    pub relay_state: String,
}

/// 특정 계정에 대한 주체 할당
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountAssignments {
    /// 직접 할당된 사용자 ID 목록
    pub users: Vec<String>,
    /// 할당된 그룹 ID 목록
    pub groups: Vec<String>,
}

/// 권한 세트가 프로비저닝된 계정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountEntry {
    pub id: String,
    pub name: String,
    pub status: String,
    pub assignments: AccountAssignments,
}

/// 권한 세트 하나와 그 할당 계정들
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionSetEntry {
    #[serde(rename = "permissionset_details")]
    pub details: PermissionSetDetails,
    pub accounts: Vec<AccountEntry>,
}

/// 권한 세트 ARN을 키로 하는 할당 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentSnapshot {
    pub permission_sets: BTreeMap<String, PermissionSetEntry>,
}

impl AssignmentSnapshot {
    /// JSON 문자열에서 스냅샷을 파싱합니다.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(|e| ReportError::Snapshot {
            path: "<inline>".to_owned(),
            reason: e.to_string(),
        })
    }

    /// JSON 파일에서 스냅샷을 로드합니다.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        load_json(path.as_ref())
    }
}

// --- 디렉토리 스냅샷 ---

/// 사용자 표시 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub user_name: String,
    pub display_name: String,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            user_name: NOT_AVAILABLE.to_owned(),
            display_name: NOT_AVAILABLE.to_owned(),
        }
    }
}

/// 외부 IdP 식별자
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalId {
    pub issuer: String,
    pub id: String,
}

/// 그룹 표시 정보와 멤버
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupInfo {
    pub display_name: String,
    /// 그룹 멤버 사용자 ID 목록
    pub assigned_users: Vec<String>,
    pub external_ids: Vec<ExternalId>,
}

impl Default for GroupInfo {
    fn default() -> Self {
        Self {
            display_name: NOT_AVAILABLE.to_owned(),
            assigned_users: Vec::new(),
            external_ids: Vec::new(),
        }
    }
}

/// 사용자/그룹 디렉토리 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySnapshot {
    pub users: BTreeMap<String, UserInfo>,
    pub groups: BTreeMap<String, GroupInfo>,
}

impl DirectorySnapshot {
    /// JSON 문자열에서 스냅샷을 파싱합니다.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(|e| ReportError::Snapshot {
            path: "<inline>".to_owned(),
            reason: e.to_string(),
        })
    }

    /// JSON 파일에서 스냅샷을 로드합니다.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        load_json(path.as_ref())
    }
}

// --- 변환 결과 ---

/// 계정에 적용된 권한 세트 할당
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSetAssignment {
    pub permission_set_arn: String,
    pub users: Vec<String>,
    pub groups: Vec<String>,
}

/// 계정 단위 리포트
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountReport {
    pub account_name: String,
    pub account_status: String,
    /// 권한 세트 이름 → 할당
    pub permission_sets: BTreeMap<String, PermissionSetAssignment>,
}

/// 리포트에서 참조된 모든 주체
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principals {
    pub users: BTreeMap<String, UserInfo>,
    pub groups: BTreeMap<String, GroupInfo>,
}

/// 변환된 할당 리포트
///
/// `statusCode` 200 응답의 `body`로 직렬화됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentReport {
    /// 계정 ID → 계정 리포트
    pub accounts: BTreeMap<String, AccountReport>,
    pub principals: Principals,
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ReportError> {
    let snapshot_error = |reason: String| ReportError::Snapshot {
        path: path.display().to_string(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| snapshot_error(e.to_string()))?;
    if metadata.len() > MAX_SNAPSHOT_FILE_SIZE {
        return Err(snapshot_error(format!(
            "file too large: {} bytes (max: {} bytes)",
            metadata.len(),
            MAX_SNAPSHOT_FILE_SIZE
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| snapshot_error(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| snapshot_error(e.to_string()))
}
