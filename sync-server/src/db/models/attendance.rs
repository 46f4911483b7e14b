//! Attendance Record Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::client::RosterEntry;
use shared::types::AttendanceStatus;
use surrealdb::RecordId;

pub type AttendanceId = RecordId;

/// One employee's final marking for one session.
///
/// Keyed `{sessionDate}_{employeeId}`; written once per session in the
/// stop() batch, overwritten only through the admin re-edit flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AttendanceId>,

    /// Calendar date of the session, `yyyy-MM-dd`
    pub session_date: String,

    /// Employee uid ("employee:xyz")
    pub employee_id: String,

    /// Name snapshot at marking time
    pub employee_name: String,

    pub status: AttendanceStatus,

    /// Required when status is NotAvailable
    pub reason: Option<String>,

    /// Unix millis
    pub marked_at: i64,
}

impl AttendanceRecord {
    pub fn to_roster_entry(&self) -> RosterEntry {
        RosterEntry {
            employee_id: self.employee_id.clone(),
            employee_name: self.employee_name.clone(),
            status: self.status,
            reason: self.reason.clone(),
        }
    }
}
