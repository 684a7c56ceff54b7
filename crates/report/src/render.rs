//! CSV 렌더링
//!
//! 리포트 하나에서 타임스탬프가 붙은 세 개의 CSV를 만듭니다.
//!
//! | 파일 | 컬럼 |
//! |------|------|
//! | `<ts>_assignments.csv` | account_id, account_name, permission_set_name, group_id, user_id |
//! | `<ts>_user_lookup.csv` | principal_id, display_name, user_name |
//! | `<ts>_group_lookup.csv` | principal_id, display_name, external_id_0, external_id_issuer_0 |
//!
//! 할당 CSV는 그룹 할당을 그룹 멤버 단위로 펼친 행만 포함합니다.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use idc_verify_core::error::ReportError;

use crate::model::AssignmentReport;

/// 파일명 타임스탬프 형식
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 렌더링된 CSV 세트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReport {
    /// 파일명 접두사 (`%Y%m%d_%H%M%S`)
    pub timestamp: String,
    pub assignments: String,
    pub user_lookup: String,
    pub group_lookup: String,
}

impl CsvReport {
    /// `(파일명, 내용)` 목록을 반환합니다.
    pub fn files(&self) -> [(String, &str); 3] {
        [
            (format!("{}_assignments.csv", self.timestamp), self.assignments.as_str()),
            (format!("{}_user_lookup.csv", self.timestamp), self.user_lookup.as_str()),
            (format!("{}_group_lookup.csv", self.timestamp), self.group_lookup.as_str()),
        ]
    }

    /// `dir` 아래에 세 파일을 기록하고 경로를 반환합니다.
    ///
    /// 디렉토리가 없으면 생성합니다.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| ReportError::Render(format!("{}: {e}", dir.display())))?;

        let mut written = Vec::with_capacity(3);
        for (name, content) in self.files() {
            let path = dir.join(name);
            std::fs::write(&path, content)
                .map_err(|e| ReportError::Render(format!("{}: {e}", path.display())))?;
            info!(path = %path.display(), "report file written");
            written.push(path);
        }
        Ok(written)
    }
}

/// 파일명 타임스탬프를 만듭니다.
pub fn timestamp(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// 현재 시각으로 CSV를 렌더링합니다.
pub fn render(report: &AssignmentReport) -> Result<CsvReport, ReportError> {
    render_at(report, &timestamp(Local::now()))
}

/// 지정한 타임스탬프로 CSV를 렌더링합니다.
pub fn render_at(report: &AssignmentReport, timestamp: &str) -> Result<CsvReport, ReportError> {
    Ok(CsvReport {
        timestamp: timestamp.to_owned(),
        assignments: assignments_csv(report)?,
        user_lookup: user_lookup_csv(report)?,
        group_lookup: group_lookup_csv(report)?,
    })
}

fn assignments_csv(report: &AssignmentReport) -> Result<String, ReportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "account_id",
        "account_name",
        "permission_set_name",
        "group_id",
        "user_id",
    ])
    .map_err(render_error)?;

    for (account_id, account) in &report.accounts {
        for (ps_name, assignment) in &account.permission_sets {
            for group_id in &assignment.groups {
                let Some(group) = report.principals.groups.get(group_id) else {
                    continue;
                };
                for user_id in &group.assigned_users {
                    wtr.write_record([
                        account_id.as_str(),
                        account.account_name.as_str(),
                        ps_name.as_str(),
                        group_id.as_str(),
                        user_id.as_str(),
                    ])
                    .map_err(render_error)?;
                }
            }
        }
    }

    finish(wtr)
}

fn user_lookup_csv(report: &AssignmentReport) -> Result<String, ReportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["principal_id", "display_name", "user_name"])
        .map_err(render_error)?;

    for (user_id, user) in &report.principals.users {
        wtr.write_record([
            user_id.as_str(),
            user.display_name.as_str(),
            user.user_name.as_str(),
        ])
        .map_err(render_error)?;
    }

    finish(wtr)
}

fn group_lookup_csv(report: &AssignmentReport) -> Result<String, ReportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "principal_id",
        "display_name",
        "external_id_0",
        "external_id_issuer_0",
    ])
    .map_err(render_error)?;

    for (group_id, group) in &report.principals.groups {
        let (external_id, issuer) = group
            .external_ids
            .first()
            .map(|e| (e.id.as_str(), e.issuer.as_str()))
            .unwrap_or_default();
        wtr.write_record([
            group_id.as_str(),
            group.display_name.as_str(),
            external_id,
            issuer,
        ])
        .map_err(render_error)?;
    }

    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ReportError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| ReportError::Render(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Render(e.to_string()))
}

fn render_error(e: csv::Error) -> ReportError {
    ReportError::Render(e.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::model::{AssignmentSnapshot, DirectorySnapshot};
    use crate::transform::transform;

    fn report() -> AssignmentReport {
        let snapshot = AssignmentSnapshot::from_json(
            r#"{
                "arn:ps-admin": {
                    "permissionset_details": {"name": "AdministratorAccess"},
                    "accounts": [
                        {"id": "111", "name": "security, prod", "status": "ACTIVE",
                         "assignments": {"users": ["u-9"], "groups": ["g-1"]}}
                    ]
                }
            }"#,
        )
        .unwrap();
        let directory: InMemoryDirectory = DirectorySnapshot::from_json(
            r#"{
                "users": {
                    "u-1": {"user_name": "alice", "display_name": "Alice"},
                    "u-2": {"user_name": "bob", "display_name": "Bob"}
                },
                "groups": {
                    "g-1": {"display_name": "admins", "assigned_users": ["u-1", "u-2"],
                            "external_ids": [{"issuer": "https://idp", "id": "ext-1"}]}
                }
            }"#,
        )
        .unwrap()
        .into();
        transform(&snapshot, &directory)
    }

    #[test]
    fn timestamp_uses_compact_format() {
        let now = Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(timestamp(now), "20250307_090501");
    }

    #[test]
    fn assignments_expand_group_members() {
        let csv = render_at(&report(), "ts").unwrap();
        let lines: Vec<&str> = csv.assignments.lines().collect();
        assert_eq!(
            lines,
            [
                "account_id,account_name,permission_set_name,group_id,user_id",
                "111,\"security, prod\",AdministratorAccess,g-1,u-1",
                "111,\"security, prod\",AdministratorAccess,g-1,u-2",
            ]
        );
    }

    #[test]
    fn user_lookup_has_three_columns() {
        let csv = render_at(&report(), "ts").unwrap();
        let lines: Vec<&str> = csv.user_lookup.lines().collect();
        assert_eq!(lines[0], "principal_id,display_name,user_name");
        assert_eq!(lines[1], "u-1,Alice,alice");
        assert_eq!(lines[3], "u-9,n/a,n/a");
        assert!(lines.iter().all(|l| l.split(',').count() == 3));
    }

    #[test]
    fn group_lookup_takes_first_external_id() {
        let csv = render_at(&report(), "ts").unwrap();
        let lines: Vec<&str> = csv.group_lookup.lines().collect();
        assert_eq!(
            lines,
            [
                "principal_id,display_name,external_id_0,external_id_issuer_0",
                "g-1,admins,ext-1,https://idp",
            ]
        );
    }

    #[test]
    fn empty_report_renders_headers_only() {
        let csv = render_at(&AssignmentReport::default(), "ts").unwrap();
        assert_eq!(csv.assignments.lines().count(), 1);
        assert_eq!(csv.user_lookup.lines().count(), 1);
        assert_eq!(csv.group_lookup.lines().count(), 1);
    }

    #[test]
    fn write_to_creates_timestamped_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("idc-reports");
        let csv = render_at(&report(), "20250307_090501").unwrap();

        let written = csv.write_to(&target).unwrap();

        let names: Vec<String> = written
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "20250307_090501_assignments.csv",
                "20250307_090501_user_lookup.csv",
                "20250307_090501_group_lookup.csv",
            ]
        );
        let content = std::fs::read_to_string(&written[1]).unwrap();
        assert!(content.starts_with("principal_id,display_name,user_name"));
    }
}
