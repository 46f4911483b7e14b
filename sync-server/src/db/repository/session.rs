//! Session Repository
//!
//! Sessions are keyed by their `yyyy-MM-dd` date string, so there can only
//! ever be one document per day per kind.

use serde::Serialize;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Session, SessionSchedule};
use shared::types::{AttendanceStatus, SessionKind};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

/// One attendance row handed to the stop() transaction
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceWrite {
    /// Record key `{sessionDate}_{employeeId}`
    pub key: String,
    pub session_date: String,
    pub employee_id: String,
    pub employee_name: String,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
    pub marked_at: i64,
}

#[derive(Clone)]
pub struct SessionRepository {
    base: BaseRepository,
}

impl SessionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find the session for a calendar day
    pub async fn find_by_date(&self, kind: SessionKind, date: &str) -> RepoResult<Option<Session>> {
        let thing = RecordId::from_table_key(kind.table(), date);
        let session: Option<Session> = self.base.db().select(thing).await?;
        Ok(session)
    }

    /// Create or overwrite the day's session as Scheduled
    ///
    /// Re-scheduling an already ended day is refused upstream; here the
    /// upsert is unconditional because the record key pins the day.
    pub async fn upsert_scheduled(
        &self,
        kind: SessionKind,
        data: SessionSchedule,
    ) -> RepoResult<Session> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPSERT type::thing($tb, $date) CONTENT {
                    session_date: $date,
                    status: 'SCHEDULED',
                    scheduled_time: $scheduled_time,
                    started_at: NONE,
                    ended_at: NONE,
                    scheduled_by: $scheduled_by
                } RETURN AFTER"#,
            )
            .bind(("tb", kind.table()))
            .bind(("date", data.session_date))
            .bind(("scheduled_time", data.scheduled_time))
            .bind(("scheduled_by", data.scheduled_by))
            .await?;

        result
            .take::<Option<Session>>(0)?
            .ok_or_else(|| RepoError::Database("Failed to schedule session".to_string()))
    }

    /// Scheduled -> Active, guarded in the store
    pub async fn mark_active(
        &self,
        kind: SessionKind,
        date: &str,
        started_at: i64,
    ) -> RepoResult<Session> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE type::thing($tb, $date)
                    SET status = 'ACTIVE', started_at = $started_at
                    WHERE status = 'SCHEDULED'
                RETURN AFTER"#,
            )
            .bind(("tb", kind.table()))
            .bind(("date", date.to_string()))
            .bind(("started_at", started_at))
            .await?;

        result.take::<Option<Session>>(0)?.ok_or_else(|| {
            RepoError::InvalidState(format!(
                "Session {date} is not in the scheduled state"
            ))
        })
    }

    /// Active -> Ended plus the attendance batch, in one transaction
    ///
    /// The status flip is guarded; a session that is no longer active makes
    /// the whole transaction throw, so no attendance rows land either.
    pub async fn end_with_attendance(
        &self,
        kind: SessionKind,
        date: &str,
        ended_at: i64,
        records: Vec<AttendanceWrite>,
    ) -> RepoResult<Session> {
        let map_err = |e: surrealdb::Error| {
            let msg = e.to_string();
            if msg.contains("not active") {
                RepoError::InvalidState(format!("Session {date} is not active"))
            } else {
                RepoError::Database(msg)
            }
        };

        self.base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                LET $updated = UPDATE type::thing($tb, $date)
                    SET status = 'ENDED', ended_at = $ended_at
                    WHERE status = 'ACTIVE'
                RETURN AFTER;
                IF count($updated) == 0 { THROW "session is not active" };
                FOR $r IN $records {
                    UPSERT type::thing($att_tb, $r.key) CONTENT {
                        session_date: $r.session_date,
                        employee_id: $r.employee_id,
                        employee_name: $r.employee_name,
                        status: $r.status,
                        reason: $r.reason,
                        marked_at: $r.marked_at
                    };
                };
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("tb", kind.table()))
            .bind(("att_tb", kind.attendance_table()))
            .bind(("date", date.to_string()))
            .bind(("ended_at", ended_at))
            .bind(("records", records))
            .await
            .map_err(map_err)?
            .check()
            .map_err(map_err)?;

        self.find_by_date(kind, date)
            .await?
            .ok_or_else(|| RepoError::InvalidState(format!("Session {date} is not active")))
    }
}
