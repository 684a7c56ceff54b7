//! 사용자/그룹 조회 추상화
//!
//! [`IdentityDirectory`]는 변환기가 주체 정보를 얻는 유일한 경로입니다.
//! 알 수 없는 ID는 에러가 아니라 `n/a` 값으로 조회됩니다.

use tracing::warn;

use crate::model::{DirectorySnapshot, GroupInfo, UserInfo};

/// 주체 조회 인터페이스
pub trait IdentityDirectory {
    /// 사용자 정보를 조회합니다. 없으면 `n/a`/`n/a`를 반환합니다.
    fn user(&self, user_id: &str) -> UserInfo;

    /// 그룹 정보를 조회합니다. 없으면 표시명 `n/a`, 멤버 없음을 반환합니다.
    fn group(&self, group_id: &str) -> GroupInfo;
}

/// 스냅샷 기반 디렉토리
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    snapshot: DirectorySnapshot,
}

impl InMemoryDirectory {
    pub fn new(snapshot: DirectorySnapshot) -> Self {
        Self { snapshot }
    }

    pub fn user_count(&self) -> usize {
        self.snapshot.users.len()
    }

    pub fn group_count(&self) -> usize {
        self.snapshot.groups.len()
    }
}

impl From<DirectorySnapshot> for InMemoryDirectory {
    fn from(snapshot: DirectorySnapshot) -> Self {
        Self::new(snapshot)
    }
}

impl IdentityDirectory for InMemoryDirectory {
    fn user(&self, user_id: &str) -> UserInfo {
        match self.snapshot.users.get(user_id) {
            Some(info) => info.clone(),
            None => {
                warn!(user_id, "user not found in directory");
                UserInfo::default()
            }
        }
    }

    fn group(&self, group_id: &str) -> GroupInfo {
        match self.snapshot.groups.get(group_id) {
            Some(info) => info.clone(),
            None => {
                warn!(group_id, "group not found in directory");
                GroupInfo::default()
            }
        }
    }
}
