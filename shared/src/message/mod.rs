//! Message bus types
//!
//! Shared between sync-server and clients, for both in-process (memory)
//! and network (TCP) communication.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// Wire protocol version
pub const PROTOCOL_VERSION: u16 = 1;

/// Message bus event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Connection handshake
    Handshake = 0,
    /// System notification
    Notification = 1,
    /// Resource change signal
    Sync = 2,
    /// Handshake / request response
    Response = 3,
}

impl TryFrom<u8> for EventType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EventType::Handshake),
            1 => Ok(EventType::Notification),
            2 => Ok(EventType::Sync),
            3 => Ok(EventType::Response),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Handshake => write!(f, "handshake"),
            EventType::Notification => write!(f, "notification"),
            EventType::Sync => write!(f, "sync"),
            EventType::Response => write!(f, "response"),
        }
    }
}

/// Transport-level message body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    pub source: Option<String>,
    pub target: Option<String>,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            source: None,
            target: None,
            payload,
        }
    }

    /// Address the message to a single client
    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    /// Create a handshake message
    pub fn handshake(payload: &HandshakePayload) -> Self {
        Self::new(
            EventType::Handshake,
            serde_json::to_vec(payload).expect("Failed to serialize handshake payload"),
        )
    }

    /// Create a notification message
    pub fn notification(payload: &NotificationPayload) -> Self {
        Self::new(
            EventType::Notification,
            serde_json::to_vec(payload).expect("Failed to serialize notification"),
        )
    }

    /// Create a sync signal message
    pub fn sync(payload: &SyncPayload) -> Self {
        Self::new(
            EventType::Sync,
            serde_json::to_vec(payload).expect("Failed to serialize sync payload"),
        )
    }

    /// Create a response message
    pub fn response(payload: &ResponsePayload) -> Self {
        Self::new(
            EventType::Response,
            serde_json::to_vec(payload).expect("Failed to serialize response payload"),
        )
    }

    /// Parse the payload as the given type
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_message_roundtrip() {
        let payload = SyncPayload {
            resource: "standup".to_string(),
            version: 3,
            action: "updated".to_string(),
            id: "2024-03-01".to_string(),
            data: None,
        };
        let msg = BusMessage::sync(&payload);

        assert_eq!(msg.event_type, EventType::Sync);
        let parsed: SyncPayload = msg.parse_payload().unwrap();
        assert_eq!(parsed.resource, "standup");
        assert_eq!(parsed.version, 3);
    }

    #[test]
    fn test_event_type_tags() {
        assert_eq!(EventType::try_from(0u8), Ok(EventType::Handshake));
        assert_eq!(EventType::try_from(2u8), Ok(EventType::Sync));
        assert!(EventType::try_from(9u8).is_err());
    }

    #[test]
    fn test_targeted_message() {
        let msg = BusMessage::new(EventType::Notification, vec![]).with_target("client-1");
        assert_eq!(msg.target.as_deref(), Some("client-1"));
    }

    #[test]
    fn test_notification_round_trip() {
        let msg = BusMessage::notification(&NotificationPayload::error(
            "Sheet sync",
            "webhook unreachable",
        ));
        let parsed: NotificationPayload = msg.parse_payload().unwrap();
        assert_eq!(parsed.level, NotificationLevel::Error);
        assert_eq!(parsed.title, "Sheet sync");
    }
}
