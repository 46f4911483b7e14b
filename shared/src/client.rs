//! Wire DTOs shared between server and client
//!
//! Request/response types for the HTTP API. The server serializes these,
//! the client parses them back at the gateway boundary instead of trusting
//! loose JSON shapes.

use serde::{Deserialize, Serialize};

use crate::types::{AttendanceStatus, OnboardingState, SessionStatus, TimeFrame};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// User information carried alongside a token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub is_admin: bool,
    pub has_completed_setup: bool,
}

// =============================================================================
// Employee API DTOs
// =============================================================================

/// Employee as exposed over the API (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeView {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub employee_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_sheet_url: Option<String>,
    pub has_completed_setup: bool,
    pub is_admin: bool,
    pub is_active: bool,
}

// =============================================================================
// Session API DTOs
// =============================================================================

/// One roster line in an ended session (or the admin's working roster)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub employee_id: String,
    pub employee_name: String,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Session document as observed by clients.
///
/// The roster is only populated once the session has ended; an active
/// session is deliberately opaque to non-admin observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    /// Calendar date, `yyyy-MM-dd`
    pub date: String,
    pub status: SessionStatus,
    /// Scheduled start, Unix millis
    pub scheduled_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<i64>,
    pub scheduled_by: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roster: Vec<RosterEntry>,
}

/// Admin request to create (or overwrite) the day's session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Calendar date, `yyyy-MM-dd`
    pub date: String,
    /// Wall-clock start, `HH:MM`
    pub time: String,
}

/// Admin request to mark one employee while a session is active
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAttendanceRequest {
    pub employee_id: String,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// =============================================================================
// Feedback API DTOs
// =============================================================================

/// New feedback entry for a session day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSubmit {
    pub employee_id: String,
    /// Calendar date, `yyyy-MM-dd`
    pub session_date: String,
    /// 1..=5
    pub understanding: f64,
    /// 1..=5
    pub instructor: f64,
    pub comment: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Summary query, one request per filter application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSummaryQuery {
    pub employee_id: String,
    pub time_frame: TimeFrame,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Bar-chart-ready single-bucket aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub avg_understanding: f64,
    pub avg_instructor: f64,
}

/// One day of a line-chart-ready series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    /// Calendar date label, `yyyy-MM-dd`
    pub label: String,
    pub avg_understanding: f64,
    pub avg_instructor: f64,
    pub count: i64,
}

/// A quotable positive comment with its keyword tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositiveFeedback {
    pub quote: String,
    pub keywords: Vec<String>,
}

/// A recurring improvement theme with the reporter's suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementArea {
    pub theme: String,
    pub suggestion: String,
}

/// Aggregated feedback for one filter window.
///
/// Exactly one of `graph_data` / `graph_timeseries` is present for a
/// non-empty window; both are absent when `total == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSummaryResponse {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_data: Option<GraphData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_timeseries: Option<Vec<TimeseriesPoint>>,
    #[serde(default)]
    pub positive_feedback: Vec<PositiveFeedback>,
    #[serde(default)]
    pub improvement_areas: Vec<ImprovementArea>,
}

// =============================================================================
// Onboarding API DTOs
// =============================================================================

/// Persisted onboarding progress for one employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingStatusView {
    pub employee_id: String,
    pub status: OnboardingState,
    pub video_watched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

// =============================================================================
// Admin API DTOs
// =============================================================================

/// Promote-by-email request (admin console)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteRequest {
    pub email: String,
}
