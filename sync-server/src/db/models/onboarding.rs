//! Onboarding Status Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::client::OnboardingStatusView;
use shared::types::OnboardingState;
use surrealdb::RecordId;

pub type OnboardingId = RecordId;

/// Per-employee onboarding progress, keyed by the employee uid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingStatus {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OnboardingId>,

    /// Employee uid ("employee:xyz")
    pub employee_id: String,

    pub status: OnboardingState,

    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub video_watched: bool,

    /// Latest assessment score, percentage correct
    pub quiz_score: Option<f64>,

    /// Unix millis, set when the checklist gate passes
    pub completed_at: Option<i64>,
}

impl OnboardingStatus {
    pub fn to_view(&self) -> OnboardingStatusView {
        OnboardingStatusView {
            employee_id: self.employee_id.clone(),
            status: self.status,
            video_watched: self.video_watched,
            quiz_score: self.quiz_score,
            completed_at: self.completed_at,
        }
    }
}

/// Update payload from the wizard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OnboardingState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_watched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<f64>,
}
