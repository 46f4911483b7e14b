//! Session lifecycle manager
//!
//! Owns the scheduled/active/ended progression for one session per day per
//! kind, and the in-memory roster while a session is running. The roster
//! never touches the store until `stop()`, which lands the whole batch and
//! the status flip in one transaction.

use std::sync::Arc;

use dashmap::DashMap;

use crate::core::state::ResourceVersions;
use crate::db::models::SessionSchedule;
use crate::db::repository::session::AttendanceWrite;
use crate::db::repository::{AttendanceRepository, EmployeeRepository, SessionRepository};
use crate::message::MessageBus;
use crate::services::SheetSyncService;
use crate::utils::{AppError, AppResult, time};
use chrono_tz::Tz;
use shared::client::{RosterEntry, SessionView};
use shared::message::{BusMessage, SyncPayload};
use shared::types::{AttendanceStatus, SessionKind, SessionStatus};
use shared::util::{attendance_key, now_millis};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// One employee's working mark while a session is active
#[derive(Debug, Clone)]
struct RosterMark {
    employee_name: String,
    status: AttendanceStatus,
    reason: Option<String>,
}

type RosterKey = (SessionKind, String);

/// Session lifecycle manager
///
/// Cloneable; all clones share the same working rosters.
#[derive(Clone)]
pub struct SessionManager {
    db: Surreal<Db>,
    bus: MessageBus,
    versions: Arc<ResourceVersions>,
    sheet_sync: SheetSyncService,
    timezone: Tz,
    /// Working rosters of currently active sessions, keyed by (kind, date)
    rosters: Arc<DashMap<RosterKey, std::collections::HashMap<String, RosterMark>>>,
}

impl SessionManager {
    pub fn new(
        db: Surreal<Db>,
        bus: MessageBus,
        versions: Arc<ResourceVersions>,
        sheet_sync: SheetSyncService,
        timezone: Tz,
    ) -> Self {
        Self {
            db,
            bus,
            versions,
            sheet_sync,
            timezone,
            rosters: Arc::new(DashMap::new()),
        }
    }

    fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self.db.clone())
    }

    fn attendance(&self) -> AttendanceRepository {
        AttendanceRepository::new(self.db.clone())
    }

    fn employees(&self) -> EmployeeRepository {
        EmployeeRepository::new(self.db.clone())
    }

    /// Publish a sync signal for this session
    async fn broadcast(&self, kind: SessionKind, date: &str, action: &str, view: &SessionView) {
        let resource = kind.table();
        let payload = SyncPayload {
            resource: resource.to_string(),
            version: self.versions.increment(resource),
            action: action.to_string(),
            id: date.to_string(),
            data: serde_json::to_value(view).ok(),
        };
        let _ = self.bus.publish(BusMessage::sync(&payload)).await;
    }

    // ========== Admin actions ==========

    /// Create or overwrite the day's session as Scheduled.
    ///
    /// Scheduling strictly in the past is rejected before any write, for
    /// any caller. An already ended day stays immutable.
    pub async fn schedule(
        &self,
        kind: SessionKind,
        date: &str,
        time_of_day: &str,
        scheduled_by: &str,
    ) -> AppResult<SessionView> {
        let parsed_date = time::parse_date(date)?;
        let parsed_time = time::parse_time(time_of_day)?;
        let scheduled_millis = time::date_time_to_millis(parsed_date, parsed_time, self.timezone);

        if scheduled_millis < now_millis() {
            return Err(AppError::validation(
                "Cannot schedule a session in the past",
            ));
        }

        if let Some(existing) = self.sessions().find_by_date(kind, date).await? {
            match existing.status {
                SessionStatus::Ended => {
                    return Err(AppError::business_rule(format!(
                        "Session {date} has already ended"
                    )));
                }
                SessionStatus::Active => {
                    return Err(AppError::business_rule(format!(
                        "Session {date} is already in progress"
                    )));
                }
                SessionStatus::Scheduled => {} // overwrite is fine
            }
        }

        let session = self
            .sessions()
            .upsert_scheduled(
                kind,
                SessionSchedule {
                    session_date: date.to_string(),
                    scheduled_time: scheduled_millis,
                    scheduled_by: scheduled_by.to_string(),
                },
            )
            .await?;

        tracing::info!(kind = %kind, date = %date, by = %scheduled_by, "Session scheduled");

        let view = session.to_view(Vec::new());
        self.broadcast(kind, date, "scheduled", &view).await;
        Ok(view)
    }

    /// Scheduled -> Active. Seeds the working roster with every active
    /// employee defaulted to Missed.
    pub async fn start(&self, kind: SessionKind, date: &str) -> AppResult<SessionView> {
        let session = self.sessions().mark_active(kind, date, now_millis()).await?;

        let mut roster = std::collections::HashMap::new();
        for employee in self.employees().find_all().await? {
            let Some(id) = employee.id.as_ref() else {
                continue;
            };
            roster.insert(
                id.to_string(),
                RosterMark {
                    employee_name: employee.display_name.clone(),
                    status: AttendanceStatus::Missed,
                    reason: None,
                },
            );
        }
        let seeded = roster.len();
        self.rosters.insert((kind, date.to_string()), roster);

        tracing::info!(kind = %kind, date = %date, employees = seeded, "Session started");

        let view = session.to_view(Vec::new());
        self.broadcast(kind, date, "started", &view).await;
        Ok(view)
    }

    /// Mark one employee while the session is active. In-memory only; the
    /// store is untouched until `stop()`.
    pub async fn set_attendance(
        &self,
        kind: SessionKind,
        date: &str,
        employee_id: &str,
        status: AttendanceStatus,
        reason: Option<String>,
    ) -> AppResult<()> {
        if status.requires_reason() && reason.as_deref().is_none_or(|r| r.trim().is_empty()) {
            return Err(AppError::validation("Not Available requires a reason"));
        }

        let mut roster = self
            .rosters
            .get_mut(&(kind, date.to_string()))
            .ok_or_else(|| {
                AppError::business_rule(format!("Session {date} is not active"))
            })?;

        let mark = roster.get_mut(employee_id).ok_or_else(|| {
            AppError::not_found(format!("Employee {employee_id} is not on the roster"))
        })?;

        mark.status = status;
        mark.reason = if status.requires_reason() {
            reason.map(|r| r.trim().to_string())
        } else {
            None
        };

        Ok(())
    }

    /// Active -> Ended. Writes one attendance record per seeded employee
    /// (untouched employees stay Missed) together with the status flip,
    /// then discards the working roster and fires the spreadsheet sync.
    pub async fn stop(&self, kind: SessionKind, date: &str) -> AppResult<SessionView> {
        let key = (kind, date.to_string());
        let roster = self
            .rosters
            .get(&key)
            .map(|r| r.value().clone())
            .ok_or_else(|| AppError::business_rule(format!("Session {date} is not active")))?;

        let marked_at = now_millis();
        let records: Vec<AttendanceWrite> = roster
            .iter()
            .map(|(employee_id, mark)| AttendanceWrite {
                key: attendance_key(date, employee_id.trim_start_matches("employee:")),
                session_date: date.to_string(),
                employee_id: employee_id.clone(),
                employee_name: mark.employee_name.clone(),
                status: mark.status,
                reason: mark.reason.clone(),
                marked_at,
            })
            .collect();

        let session = self
            .sessions()
            .end_with_attendance(kind, date, marked_at, records)
            .await?;

        // Server write confirmed; local optimistic state is now obsolete
        self.rosters.remove(&key);

        let roster_entries = self
            .attendance()
            .find_by_session(kind, date)
            .await?
            .iter()
            .map(|r| r.to_roster_entry())
            .collect::<Vec<_>>();

        tracing::info!(
            kind = %kind,
            date = %date,
            records = roster_entries.len(),
            "Session ended"
        );

        if kind == SessionKind::Standup {
            self.sheet_sync.sync_roster(date, &roster_entries);
        }

        let view = session.to_view(roster_entries);
        self.broadcast(kind, date, "ended", &view).await;
        Ok(view)
    }

    /// Overwrite one record of an ended standup (admin re-edit flow)
    pub async fn edit_ended_attendance(
        &self,
        kind: SessionKind,
        date: &str,
        employee_id: &str,
        status: AttendanceStatus,
        reason: Option<String>,
    ) -> AppResult<RosterEntry> {
        if kind != SessionKind::Standup {
            return Err(AppError::business_rule(
                "Only standup attendance can be re-edited",
            ));
        }

        let session = self
            .sessions()
            .find_by_date(kind, date)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session {date} not found")))?;
        if session.status != SessionStatus::Ended {
            return Err(AppError::business_rule(format!(
                "Session {date} has not ended yet"
            )));
        }

        let employee = self
            .employees()
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employee {employee_id} not found")))?;

        let record = self
            .attendance()
            .upsert_one(
                kind,
                date,
                employee_id,
                &employee.display_name,
                status,
                reason,
                now_millis(),
            )
            .await?;

        let view = self.view(kind, date, true).await?;
        if let Some(view) = view {
            self.broadcast(kind, date, "attendance_edited", &view).await;
        }

        Ok(record.to_roster_entry())
    }

    // ========== Observation ==========

    /// The session view for a day, shaped by the caller's role.
    ///
    /// - Scheduled: time visible, no roster
    /// - Active: admins see the working roster, others a bare placeholder
    /// - Ended: the persisted roster, read-only
    pub async fn view(
        &self,
        kind: SessionKind,
        date: &str,
        is_admin: bool,
    ) -> AppResult<Option<SessionView>> {
        let Some(session) = self.sessions().find_by_date(kind, date).await? else {
            return Ok(None);
        };

        let roster = match session.status {
            SessionStatus::Scheduled => Vec::new(),
            SessionStatus::Active => {
                if is_admin {
                    self.rosters
                        .get(&(kind, date.to_string()))
                        .map(|r| {
                            let mut entries: Vec<RosterEntry> = r
                                .iter()
                                .map(|(id, mark)| RosterEntry {
                                    employee_id: id.clone(),
                                    employee_name: mark.employee_name.clone(),
                                    status: mark.status,
                                    reason: mark.reason.clone(),
                                })
                                .collect();
                            entries.sort_by(|a, b| a.employee_name.cmp(&b.employee_name));
                            entries
                        })
                        .unwrap_or_default()
                } else {
                    Vec::new()
                }
            }
            SessionStatus::Ended => self
                .attendance()
                .find_by_session(kind, date)
                .await?
                .iter()
                .map(|r| r.to_roster_entry())
                .collect(),
        };

        Ok(Some(session.to_view(roster)))
    }

    /// Today's session for the business timezone
    pub async fn today(&self, kind: SessionKind, is_admin: bool) -> AppResult<Option<SessionView>> {
        let date = time::today(self.timezone).format("%Y-%m-%d").to_string();
        self.view(kind, &date, is_admin).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::EmployeeCreate;
    use chrono::Datelike;

    async fn manager_with_employees(count: usize) -> (SessionManager, Vec<String>) {
        let svc = DbService::in_memory().await.unwrap();
        let bus = MessageBus::new();
        let manager = SessionManager::new(
            svc.db.clone(),
            bus,
            Arc::new(ResourceVersions::new()),
            SheetSyncService::disabled(),
            chrono_tz::UTC,
        );

        let repo = EmployeeRepository::new(svc.db.clone());
        let mut ids = Vec::new();
        for i in 0..count {
            let created = repo
                .create(EmployeeCreate {
                    username: format!("user{i}"),
                    password: "correct-horse-battery".to_string(),
                    display_name: Some(format!("User {i}")),
                    email: format!("user{i}@example.com"),
                    employee_code: format!("NXT-{i:04}"),
                })
                .await
                .unwrap();
            ids.push(created.id.unwrap().to_string());
        }
        (manager, ids)
    }

    fn tomorrow() -> String {
        let date = chrono::Utc::now().date_naive().succ_opt().unwrap();
        format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        )
    }

    #[tokio::test]
    async fn test_schedule_in_past_rejected() {
        let (manager, _) = manager_with_employees(0).await;
        let err = manager
            .schedule(SessionKind::Standup, "2020-01-01", "09:00", "employee:admin")
            .await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_full_lifecycle_persists_batch() {
        let (manager, ids) = manager_with_employees(10).await;
        let date = tomorrow();

        manager
            .schedule(SessionKind::Standup, &date, "23:59", "employee:admin")
            .await
            .unwrap();

        let started = manager.start(SessionKind::Standup, &date).await.unwrap();
        assert_eq!(started.status, SessionStatus::Active);

        // Mark 6 of 10 Present; the rest stay Missed
        for id in ids.iter().take(6) {
            manager
                .set_attendance(
                    SessionKind::Standup,
                    &date,
                    id,
                    AttendanceStatus::Present,
                    None,
                )
                .await
                .unwrap();
        }

        let ended = manager.stop(SessionKind::Standup, &date).await.unwrap();
        assert_eq!(ended.status, SessionStatus::Ended);
        assert!(ended.ended_at.is_some());
        assert_eq!(ended.roster.len(), 10);

        let present = ended
            .roster
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count();
        let missed = ended
            .roster
            .iter()
            .filter(|r| r.status == AttendanceStatus::Missed)
            .count();
        assert_eq!(present, 6);
        assert_eq!(missed, 4);
    }

    #[tokio::test]
    async fn test_no_status_regression() {
        let (manager, _) = manager_with_employees(1).await;
        let date = tomorrow();

        // stop before start: nothing active
        let err = manager.stop(SessionKind::Standup, &date).await;
        assert!(matches!(err, Err(AppError::BusinessRule(_))));

        manager
            .schedule(SessionKind::Standup, &date, "23:59", "employee:admin")
            .await
            .unwrap();
        manager.start(SessionKind::Standup, &date).await.unwrap();

        // start again from Active is rejected
        let err = manager.start(SessionKind::Standup, &date).await;
        assert!(matches!(err, Err(AppError::BusinessRule(_))));

        manager.stop(SessionKind::Standup, &date).await.unwrap();

        // ended session cannot be re-scheduled
        let err = manager
            .schedule(SessionKind::Standup, &date, "23:59", "employee:admin")
            .await;
        assert!(matches!(err, Err(AppError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn test_not_available_requires_reason() {
        let (manager, ids) = manager_with_employees(1).await;
        let date = tomorrow();

        manager
            .schedule(SessionKind::Standup, &date, "23:59", "employee:admin")
            .await
            .unwrap();
        manager.start(SessionKind::Standup, &date).await.unwrap();

        let err = manager
            .set_attendance(
                SessionKind::Standup,
                &date,
                &ids[0],
                AttendanceStatus::NotAvailable,
                None,
            )
            .await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        manager
            .set_attendance(
                SessionKind::Standup,
                &date,
                &ids[0],
                AttendanceStatus::NotAvailable,
                Some("on leave".to_string()),
            )
            .await
            .unwrap();

        let ended = manager.stop(SessionKind::Standup, &date).await.unwrap();
        assert_eq!(ended.roster[0].status, AttendanceStatus::NotAvailable);
        assert_eq!(ended.roster[0].reason.as_deref(), Some("on leave"));
    }

    #[tokio::test]
    async fn test_non_admin_sees_no_roster_while_active() {
        let (manager, _) = manager_with_employees(3).await;
        let date = tomorrow();

        manager
            .schedule(SessionKind::Standup, &date, "23:59", "employee:admin")
            .await
            .unwrap();
        manager.start(SessionKind::Standup, &date).await.unwrap();

        let admin_view = manager
            .view(SessionKind::Standup, &date, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin_view.roster.len(), 3);

        let employee_view = manager
            .view(SessionKind::Standup, &date, false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(employee_view.status, SessionStatus::Active);
        assert!(employee_view.roster.is_empty());
    }

    #[tokio::test]
    async fn test_ended_standup_reedit() {
        let (manager, ids) = manager_with_employees(1).await;
        let date = tomorrow();

        manager
            .schedule(SessionKind::Standup, &date, "23:59", "employee:admin")
            .await
            .unwrap();
        manager.start(SessionKind::Standup, &date).await.unwrap();

        // re-edit before the session ends is refused
        let err = manager
            .edit_ended_attendance(
                SessionKind::Standup,
                &date,
                &ids[0],
                AttendanceStatus::Present,
                None,
            )
            .await;
        assert!(matches!(err, Err(AppError::BusinessRule(_))));

        manager.stop(SessionKind::Standup, &date).await.unwrap();

        let entry = manager
            .edit_ended_attendance(
                SessionKind::Standup,
                &date,
                &ids[0],
                AttendanceStatus::Absent,
                None,
            )
            .await
            .unwrap();
        assert_eq!(entry.status, AttendanceStatus::Absent);

        // learning hours have no re-edit flow
        let err = manager
            .edit_ended_attendance(
                SessionKind::LearningHour,
                &date,
                &ids[0],
                AttendanceStatus::Absent,
                None,
            )
            .await;
        assert!(matches!(err, Err(AppError::BusinessRule(_))));
    }
}
