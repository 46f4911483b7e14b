//! Onboarding wizard
//!
//! Three strictly linear steps with purely local state, persisted only at
//! completion: video gate, resource checklist, final checklist with an
//! embedded assessment.

use std::collections::HashSet;

use crate::http::HttpClient;
use crate::{ClientError, ClientResult};
use shared::client::OnboardingStatusView;
use shared::types::OnboardingState;

/// Playback share that counts as having watched the training video
pub const VIDEO_COMPLETION_THRESHOLD: f64 = 0.8;

/// Assessment score treated as a passing attempt
pub const QUIZ_PASS_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Video,
    Resources,
    Checklist,
}

/// One checklist item on the final step
#[derive(Debug, Clone)]
pub struct ChecklistItem {
    pub label: String,
    pub checked: bool,
    /// Auto-checked from the video step, not hand-toggled
    pub tracks_video: bool,
}

/// Latest assessment attempt
#[derive(Debug, Clone, Copy)]
pub struct QuizAttempt {
    /// Percentage correct
    pub score: f64,
}

impl QuizAttempt {
    pub fn passed(&self) -> bool {
        self.score >= QUIZ_PASS_THRESHOLD
    }
}

/// The wizard's local state
#[derive(Debug, Clone)]
pub struct OnboardingWizard {
    step: WizardStep,
    /// Latched once playback crosses the threshold; never resets within
    /// the session
    video_threshold_reached: bool,
    resources: Vec<String>,
    visited: HashSet<String>,
    checklist: Vec<ChecklistItem>,
    quiz: Option<QuizAttempt>,
}

impl OnboardingWizard {
    /// Wizard over the given resource URLs and checklist labels.
    ///
    /// One checklist item tracks the training video automatically.
    pub fn new(resources: Vec<String>, extra_checklist: Vec<String>) -> Self {
        let mut checklist = vec![ChecklistItem {
            label: "Watched the training video".to_string(),
            checked: false,
            tracks_video: true,
        }];
        checklist.extend(extra_checklist.into_iter().map(|label| ChecklistItem {
            label,
            checked: false,
            tracks_video: false,
        }));

        Self {
            step: WizardStep::Video,
            video_threshold_reached: false,
            resources,
            visited: HashSet::new(),
            checklist,
            quiz: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    // ========== Step 1: video ==========

    /// Feed one playback progress tick (polled while playing)
    pub fn report_video_progress(&mut self, position_secs: f64, duration_secs: f64) {
        if duration_secs <= 0.0 {
            return;
        }
        if position_secs / duration_secs >= VIDEO_COMPLETION_THRESHOLD {
            self.video_threshold_reached = true;
        }
    }

    pub fn video_complete(&self) -> bool {
        self.video_threshold_reached
    }

    /// "Continue" on the video step
    pub fn can_continue_video(&self) -> bool {
        self.video_threshold_reached
    }

    pub fn continue_to_resources(&mut self) -> bool {
        if self.step == WizardStep::Video && self.can_continue_video() {
            self.step = WizardStep::Resources;
            true
        } else {
            false
        }
    }

    // ========== Step 2: resources ==========

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Mark one resource visited. Returns the URL to open when it is one
    /// of the listed resources.
    pub fn visit_resource(&mut self, url: &str) -> Option<&str> {
        let listed = self.resources.iter().find(|r| r.as_str() == url)?;
        self.visited.insert(url.to_string());
        Some(listed.as_str())
    }

    /// "Continue" on the resource step: every listed URL visited at least once
    pub fn can_continue_resources(&self) -> bool {
        self.resources.iter().all(|r| self.visited.contains(r))
    }

    pub fn continue_to_checklist(&mut self) -> bool {
        if self.step == WizardStep::Resources && self.can_continue_resources() {
            self.step = WizardStep::Checklist;
            self.sync_video_item();
            true
        } else {
            false
        }
    }

    // ========== Step 3: checklist + assessment ==========

    fn sync_video_item(&mut self) {
        for item in &mut self.checklist {
            if item.tracks_video {
                item.checked = self.video_threshold_reached;
            }
        }
    }

    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.checklist
    }

    /// Hand-toggle one item. The video-tracking item is not toggleable.
    pub fn set_item_checked(&mut self, index: usize, checked: bool) -> bool {
        match self.checklist.get_mut(index) {
            Some(item) if !item.tracks_video => {
                item.checked = checked;
                true
            }
            _ => false,
        }
    }

    /// Record an assessment attempt. Retaking overwrites the prior score.
    /// Returns whether the attempt passed.
    pub fn record_quiz(&mut self, correct: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        let score = correct as f64 / total as f64 * 100.0;
        let attempt = QuizAttempt { score };
        let passed = attempt.passed();
        self.quiz = Some(attempt);
        passed
    }

    pub fn quiz(&self) -> Option<QuizAttempt> {
        self.quiz
    }

    /// "Submit": every item checked (the video item via its gate) and the
    /// assessment attempted — attempting, not passing, unlocks submission.
    pub fn can_submit(&self) -> bool {
        self.step == WizardStep::Checklist
            && self.quiz.is_some()
            && self.checklist.iter().all(|item| item.checked)
    }

    /// Move back one step. Prior answers stay as they are.
    pub fn go_back(&mut self) {
        self.step = match self.step {
            WizardStep::Video | WizardStep::Resources => WizardStep::Video,
            WizardStep::Checklist => WizardStep::Resources,
        };
    }

    /// Persist completion through the gateway. Local state is the source
    /// of truth up to this point; nothing was written earlier.
    pub async fn submit(
        &self,
        client: &HttpClient,
        employee_id: &str,
    ) -> ClientResult<OnboardingStatusView> {
        if !self.can_submit() {
            return Err(ClientError::Validation(
                "Checklist is not complete".to_string(),
            ));
        }
        client
            .update_onboarding(
                employee_id,
                Some(OnboardingState::Completed),
                Some(true),
                self.quiz.map(|q| q.score),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard() -> OnboardingWizard {
        OnboardingWizard::new(
            vec![
                "https://handbook.example.com/standups".to_string(),
                "https://handbook.example.com/feedback".to_string(),
            ],
            vec![
                "Read the team handbook".to_string(),
                "Set up the dev environment".to_string(),
            ],
        )
    }

    #[test]
    fn test_video_gate_at_eighty_percent() {
        let mut w = wizard();
        assert!(!w.can_continue_video());

        w.report_video_progress(70.0, 100.0);
        assert!(!w.can_continue_video());

        w.report_video_progress(80.0, 100.0);
        assert!(w.can_continue_video());

        // Non-resettable: seeking backwards keeps the gate open
        w.report_video_progress(10.0, 100.0);
        assert!(w.can_continue_video());
    }

    #[test]
    fn test_steps_are_strictly_linear() {
        let mut w = wizard();
        // Cannot skip ahead
        assert!(!w.continue_to_resources());
        assert!(!w.continue_to_checklist());

        w.report_video_progress(90.0, 100.0);
        assert!(w.continue_to_resources());
        assert_eq!(w.step(), WizardStep::Resources);

        // Resources not all visited yet
        assert!(!w.continue_to_checklist());
    }

    #[test]
    fn test_resource_gate_requires_every_url() {
        let mut w = wizard();
        w.report_video_progress(90.0, 100.0);
        w.continue_to_resources();

        // Unknown URLs are not counted
        assert!(w.visit_resource("https://elsewhere.example.com").is_none());
        assert!(!w.can_continue_resources());

        w.visit_resource("https://handbook.example.com/standups");
        assert!(!w.can_continue_resources());

        w.visit_resource("https://handbook.example.com/feedback");
        assert!(w.can_continue_resources());
    }

    #[test]
    fn test_submit_requires_all_items_and_an_attempt() {
        let mut w = wizard();
        w.report_video_progress(90.0, 100.0);
        w.continue_to_resources();
        w.visit_resource("https://handbook.example.com/standups");
        w.visit_resource("https://handbook.example.com/feedback");
        w.continue_to_checklist();

        // Video item auto-checked, others not
        assert!(w.checklist()[0].checked);
        assert!(!w.can_submit());

        w.set_item_checked(1, true);
        w.set_item_checked(2, true);
        // Still locked: no assessment attempt yet
        assert!(!w.can_submit());

        // A failing attempt still unlocks submission
        let passed = w.record_quiz(1, 4);
        assert!(!passed);
        assert!(w.can_submit());
    }

    #[test]
    fn test_retake_overwrites_score() {
        let mut w = wizard();
        w.record_quiz(1, 4);
        assert!((w.quiz().unwrap().score - 25.0).abs() < 1e-9);

        let passed = w.record_quiz(3, 4);
        assert!(passed);
        assert!((w.quiz().unwrap().score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_back_navigation_preserves_answers() {
        let mut w = wizard();
        w.report_video_progress(90.0, 100.0);
        w.continue_to_resources();
        w.visit_resource("https://handbook.example.com/standups");
        w.visit_resource("https://handbook.example.com/feedback");
        w.continue_to_checklist();
        w.set_item_checked(1, true);

        w.go_back();
        assert_eq!(w.step(), WizardStep::Resources);
        assert!(w.can_continue_resources());

        w.continue_to_checklist();
        assert!(w.checklist()[1].checked);
    }

    #[test]
    fn test_video_item_not_hand_toggleable() {
        let mut w = wizard();
        assert!(!w.set_item_checked(0, true));
        assert!(!w.checklist()[0].checked);
    }
}
