//! Attendance Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::AttendanceRecord;
use shared::types::{AttendanceStatus, SessionKind};
use shared::util::attendance_key;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct AttendanceRepository {
    base: BaseRepository,
}

impl AttendanceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All records for one session day, ordered by employee name
    pub async fn find_by_session(
        &self,
        kind: SessionKind,
        date: &str,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM type::table($tb) WHERE session_date = $date ORDER BY employee_name",
            )
            .bind(("tb", kind.attendance_table()))
            .bind(("date", date.to_string()))
            .await?;
        let records: Vec<AttendanceRecord> = result.take(0)?;
        Ok(records)
    }

    /// One employee's history across sessions, newest first
    pub async fn find_by_employee(
        &self,
        kind: SessionKind,
        employee_id: &str,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM type::table($tb) WHERE employee_id = $employee_id ORDER BY session_date DESC",
            )
            .bind(("tb", kind.attendance_table()))
            .bind(("employee_id", employee_id.to_string()))
            .await?;
        let records: Vec<AttendanceRecord> = result.take(0)?;
        Ok(records)
    }

    /// Overwrite one record after a session has ended (admin re-edit flow,
    /// standups only — enforced upstream)
    pub async fn upsert_one(
        &self,
        kind: SessionKind,
        date: &str,
        employee_id: &str,
        employee_name: &str,
        status: AttendanceStatus,
        reason: Option<String>,
        marked_at: i64,
    ) -> RepoResult<AttendanceRecord> {
        if status.requires_reason() && reason.as_deref().is_none_or(|r| r.trim().is_empty()) {
            return Err(RepoError::Validation(
                "Not Available requires a reason".to_string(),
            ));
        }

        let key = attendance_key(date, employee_id.trim_start_matches("employee:"));
        let thing = RecordId::from_table_key(kind.attendance_table(), key);

        let record: Option<AttendanceRecord> = self
            .base
            .db()
            .query(
                r#"UPSERT $thing CONTENT {
                    session_date: $date,
                    employee_id: $employee_id,
                    employee_name: $employee_name,
                    status: $status,
                    reason: $reason,
                    marked_at: $marked_at
                } RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("date", date.to_string()))
            .bind(("employee_id", employee_id.to_string()))
            .bind(("employee_name", employee_name.to_string()))
            .bind(("status", status))
            .bind(("reason", reason))
            .bind(("marked_at", marked_at))
            .await?
            .take(0)?;

        record.ok_or_else(|| RepoError::Database("Failed to write attendance".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_upsert_requires_reason_for_not_available() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = AttendanceRepository::new(svc.db.clone());

        let err = repo
            .upsert_one(
                SessionKind::Standup,
                "2024-03-01",
                "employee:a",
                "A",
                AttendanceStatus::NotAvailable,
                None,
                1,
            )
            .await;
        assert!(matches!(err, Err(RepoError::Validation(_))));

        let err = repo
            .upsert_one(
                SessionKind::Standup,
                "2024-03-01",
                "employee:a",
                "A",
                AttendanceStatus::NotAvailable,
                Some("   ".to_string()),
                1,
            )
            .await;
        assert!(matches!(err, Err(RepoError::Validation(_))));

        let ok = repo
            .upsert_one(
                SessionKind::Standup,
                "2024-03-01",
                "employee:a",
                "A",
                AttendanceStatus::NotAvailable,
                Some("medical leave".to_string()),
                1,
            )
            .await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_key() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = AttendanceRepository::new(svc.db.clone());

        repo.upsert_one(
            SessionKind::Standup,
            "2024-03-01",
            "employee:a",
            "A",
            AttendanceStatus::Missed,
            None,
            1,
        )
        .await
        .unwrap();
        repo.upsert_one(
            SessionKind::Standup,
            "2024-03-01",
            "employee:a",
            "A",
            AttendanceStatus::Present,
            None,
            2,
        )
        .await
        .unwrap();

        let rows = repo
            .find_by_session(SessionKind::Standup, "2024-03-01")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, AttendanceStatus::Present);
    }
}
