//! Message bus payload types

use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Notification Level ====================

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ==================== Payloads ====================

/// Handshake payload (client -> server)
///
/// Carries the client's protocol version for server-side validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakePayload {
    pub version: u16,
    pub client_name: Option<String>,
    /// Unique client identifier (UUID)
    pub client_id: Option<String>,
}

/// Notification payload (server -> client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub level: NotificationLevel,
}

impl NotificationPayload {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Resource change signal (server -> clients)
///
/// Clients compare `version` against their last-seen value per resource to
/// decide whether a refetch is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Resource type (e.g. "employee", "standup", "learning_hour")
    pub resource: String,
    /// Monotonically increasing per-resource version
    pub version: u64,
    /// Change kind ("created", "updated", "deleted", "ended", ...)
    pub action: String,
    /// Resource id (session date for sessions, uid for employees)
    pub id: String,
    /// Resource data (None for deletions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Generic response payload (server -> client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
