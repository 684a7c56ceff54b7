//! 할당 스냅샷 → 계정 중심 리포트 변환
//!
//! 1. 권한 세트별 계정 목록을 계정 ID 기준으로 재구성합니다.
//! 2. 참조된 모든 그룹을 조회해 `principals.groups`에 기록합니다.
//! 3. 직접 할당 또는 그룹 멤버십으로 참조된 모든 사용자를
//!    `principals.users`에 한 번씩 기록합니다.

use std::collections::BTreeSet;

use tracing::debug;

use crate::directory::IdentityDirectory;
use crate::model::{
    AccountReport, AssignmentReport, AssignmentSnapshot, PermissionSetAssignment,
};

/// 스냅샷을 변환합니다.
///
/// 같은 계정에 같은 이름의 권한 세트가 다시 나타나면 나중 항목이 이깁니다.
pub fn transform(
    snapshot: &AssignmentSnapshot,
    directory: &dyn IdentityDirectory,
) -> AssignmentReport {
    let mut report = AssignmentReport::default();
    let mut referenced_users: BTreeSet<String> = BTreeSet::new();
    let mut referenced_groups: BTreeSet<String> = BTreeSet::new();

    for (ps_arn, entry) in &snapshot.permission_sets {
        for account in &entry.accounts {
            let users = &account.assignments.users;
            let groups = &account.assignments.groups;
            referenced_users.extend(users.iter().cloned());
            referenced_groups.extend(groups.iter().cloned());

            let account_report =
                report
                    .accounts
                    .entry(account.id.clone())
                    .or_insert_with(|| AccountReport {
                        account_name: account.name.clone(),
                        account_status: account.status.clone(),
                        ..AccountReport::default()
                    });
            account_report.permission_sets.insert(
                entry.details.name.clone(),
                PermissionSetAssignment {
                    permission_set_arn: ps_arn.clone(),
                    users: users.clone(),
                    groups: groups.clone(),
                },
            );
        }
    }

    for group_id in referenced_groups {
        let group = directory.group(&group_id);
        referenced_users.extend(group.assigned_users.iter().cloned());
        report.principals.groups.insert(group_id, group);
    }

    for user_id in referenced_users {
        let user = directory.user(&user_id);
        report.principals.users.insert(user_id, user);
    }

    debug!(
        accounts = report.accounts.len(),
        users = report.principals.users.len(),
        groups = report.principals.groups.len(),
        "assignments transformed"
    );
    report
}
