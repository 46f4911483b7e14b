//! Shared types for Standup-Sync
//!
//! Common types used by both the server and the client: wire DTOs,
//! message bus types and small utility helpers.

pub mod client;
pub mod message;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType};

// Domain enums used on both sides of the wire
pub use types::{AttendanceStatus, OnboardingState, SessionKind, SessionStatus, TimeFrame};
