//! Live session view
//!
//! Replays server sync messages into a watchable session view. The bus is
//! the single source of truth for session status across all open clients;
//! per-resource versions guard against applying a stale broadcast after a
//! fresher one.

use tokio::sync::watch;

use shared::client::SessionView;
use shared::message::{BusMessage, EventType, SyncPayload};
use shared::types::SessionKind;

/// Watchable view of one session kind's current day
pub struct SessionWatcher {
    kind: SessionKind,
    last_version: u64,
    tx: watch::Sender<Option<SessionView>>,
}

impl SessionWatcher {
    pub fn new(kind: SessionKind) -> (Self, watch::Receiver<Option<SessionView>>) {
        let (tx, rx) = watch::channel(None);
        (
            Self {
                kind,
                last_version: 0,
                tx,
            },
            rx,
        )
    }

    /// Seed the view from an initial fetch
    pub fn seed(&mut self, view: Option<SessionView>) {
        let _ = self.tx.send(view);
    }

    /// Apply one bus message. Returns true when the view changed.
    ///
    /// Messages for other resources, and sync payloads older than the last
    /// applied version, are discarded.
    pub fn apply(&mut self, msg: &BusMessage) -> bool {
        if msg.event_type != EventType::Sync {
            return false;
        }
        let Ok(payload) = msg.parse_payload::<SyncPayload>() else {
            tracing::warn!("Malformed sync payload, ignoring");
            return false;
        };
        if payload.resource != self.kind.table() {
            return false;
        }
        if payload.version <= self.last_version {
            tracing::debug!(
                version = payload.version,
                last = self.last_version,
                "Discarding stale session sync"
            );
            return false;
        }
        self.last_version = payload.version;

        let view = payload
            .data
            .and_then(|data| serde_json::from_value::<SessionView>(data).ok());
        if view.is_none() {
            return false;
        }
        let _ = self.tx.send(view);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::SessionStatus;

    fn sync_msg(resource: &str, version: u64, status: SessionStatus) -> BusMessage {
        let view = SessionView {
            date: "2024-03-01".to_string(),
            status,
            scheduled_time: 0,
            started_at: None,
            ended_at: None,
            scheduled_by: "employee:admin".to_string(),
            roster: Vec::new(),
        };
        BusMessage::sync(&SyncPayload {
            resource: resource.to_string(),
            version,
            action: "updated".to_string(),
            id: "2024-03-01".to_string(),
            data: serde_json::to_value(&view).ok(),
        })
    }

    #[test]
    fn test_applies_matching_resource_only() {
        let (mut watcher, rx) = SessionWatcher::new(SessionKind::Standup);

        assert!(!watcher.apply(&sync_msg("learning_hour", 1, SessionStatus::Active)));
        assert!(rx.borrow().is_none());

        assert!(watcher.apply(&sync_msg("standup", 1, SessionStatus::Active)));
        assert_eq!(rx.borrow().as_ref().unwrap().status, SessionStatus::Active);
    }

    #[test]
    fn test_stale_version_discarded() {
        let (mut watcher, rx) = SessionWatcher::new(SessionKind::Standup);

        assert!(watcher.apply(&sync_msg("standup", 5, SessionStatus::Ended)));
        // A slower broadcast from before the stop arrives late
        assert!(!watcher.apply(&sync_msg("standup", 3, SessionStatus::Active)));
        assert_eq!(rx.borrow().as_ref().unwrap().status, SessionStatus::Ended);
    }
}
