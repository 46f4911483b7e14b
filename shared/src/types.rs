//! Domain enums shared between server and client

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of daily session. Each kind has its own session and attendance tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Standup,
    LearningHour,
}

impl SessionKind {
    /// Session table name
    pub fn table(&self) -> &'static str {
        match self {
            Self::Standup => "standup",
            Self::LearningHour => "learning_hour",
        }
    }

    /// Attendance table name for this kind
    pub fn attendance_table(&self) -> &'static str {
        match self {
            Self::Standup => "attendance",
            Self::LearningHour => "learning_hour_attendance",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standup => write!(f, "standup"),
            Self::LearningHour => write!(f, "learning_hour"),
        }
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standup" | "standups" => Ok(Self::Standup),
            "learning_hour" | "learning_hours" => Ok(Self::LearningHour),
            other => Err(format!("Unknown session kind: {other}")),
        }
    }
}

/// Session lifecycle status. Progression is strictly forward:
/// `Scheduled -> Active -> Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Scheduled,
    Active,
    Ended,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Active => write!(f, "active"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Attendance marking for one employee in one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Missed,
    NotAvailable,
}

impl AttendanceStatus {
    /// NotAvailable must carry an explanation; every other status stands alone
    pub fn requires_reason(&self) -> bool {
        matches!(self, Self::NotAvailable)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "Present"),
            Self::Absent => write!(f, "Absent"),
            Self::Missed => write!(f, "Missed"),
            Self::NotAvailable => write!(f, "Not Available"),
        }
    }
}

/// Onboarding progress persisted per employee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingState {
    InProgress,
    Completed,
}

/// Aggregation window for feedback summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    Daily,
    Monthly,
    Specific,
    Range,
    Full,
}

impl TimeFrame {
    /// Single-point windows produce one aggregate bucket; multi-point
    /// windows produce a per-day series.
    pub fn is_single_point(&self) -> bool {
        matches!(self, Self::Daily | Self::Monthly | Self::Specific)
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Monthly => write!(f, "monthly"),
            Self::Specific => write!(f, "specific"),
            Self::Range => write!(f, "range"),
            Self::Full => write!(f, "full"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_kind_tables() {
        assert_eq!(SessionKind::Standup.table(), "standup");
        assert_eq!(SessionKind::Standup.attendance_table(), "attendance");
        assert_eq!(
            SessionKind::LearningHour.attendance_table(),
            "learning_hour_attendance"
        );
    }

    #[test]
    fn test_attendance_reason_rule() {
        assert!(AttendanceStatus::NotAvailable.requires_reason());
        assert!(!AttendanceStatus::Present.requires_reason());
        assert!(!AttendanceStatus::Missed.requires_reason());
    }

    #[test]
    fn test_time_frame_shape() {
        assert!(TimeFrame::Daily.is_single_point());
        assert!(TimeFrame::Monthly.is_single_point());
        assert!(!TimeFrame::Range.is_single_point());
        assert!(!TimeFrame::Full.is_single_point());
    }
}
