//! Session Model
//!
//! One document per calendar day per kind, keyed by the `yyyy-MM-dd` date
//! string so re-scheduling the same day overwrites instead of duplicating.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::client::{RosterEntry, SessionView};
use shared::types::SessionStatus;
use surrealdb::RecordId;

pub type SessionId = RecordId;

/// Session entity (standup or learning hour)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<SessionId>,

    /// Calendar date, `yyyy-MM-dd` (duplicate of the record key for queries)
    pub session_date: String,

    #[serde(default = "default_status")]
    pub status: SessionStatus,

    /// Scheduled start, Unix millis
    pub scheduled_time: i64,

    /// Stamped on `start()`
    pub started_at: Option<i64>,

    /// Stamped on `stop()`
    pub ended_at: Option<i64>,

    /// Uid of the scheduling admin
    pub scheduled_by: String,
}

fn default_status() -> SessionStatus {
    SessionStatus::Scheduled
}

impl Session {
    /// Wire view; the roster is attached separately once the session ended
    pub fn to_view(&self, roster: Vec<RosterEntry>) -> SessionView {
        SessionView {
            date: self.session_date.clone(),
            status: self.status,
            scheduled_time: self.scheduled_time,
            started_at: self.started_at,
            ended_at: self.ended_at,
            scheduled_by: self.scheduled_by.clone(),
            roster,
        }
    }
}

/// Create-or-overwrite payload for scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSchedule {
    pub session_date: String,
    pub scheduled_time: i64,
    pub scheduled_by: String,
}
