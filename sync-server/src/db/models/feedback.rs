//! Feedback Entry Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

pub type FeedbackId = RecordId;

/// Whether an entry reads as praise or as an improvement request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Improvement,
}

/// One feedback entry left for an employee on a session day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<FeedbackId>,

    /// Employee the feedback is about ("employee:xyz")
    pub employee_id: String,

    /// Calendar date, `yyyy-MM-dd`
    pub session_date: String,

    /// 1..=5
    pub understanding: f64,

    /// 1..=5
    pub instructor: f64,

    pub comment: String,

    pub sentiment: Sentiment,

    /// Keyword tags on positive entries, theme tags on improvement entries
    #[serde(default)]
    pub tags: Vec<String>,

    /// Concrete suggestion carried by improvement entries
    pub suggestion: Option<String>,

    /// Unix millis
    pub submitted_at: i64,
}

/// Create payload for a feedback entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackCreate {
    pub employee_id: String,
    pub session_date: String,
    #[validate(range(min = 1.0, max = 5.0, message = "Understanding must be 1-5"))]
    pub understanding: f64,
    #[validate(range(min = 1.0, max = 5.0, message = "Instructor rating must be 1-5"))]
    pub instructor: f64,
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub comment: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub suggestion: Option<String>,
}
