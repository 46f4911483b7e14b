//! Onboarding Status Repository
//!
//! One document per employee, keyed by the employee's uid key. Created lazily
//! on first touch as InProgress.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{OnboardingStatus, OnboardingUpdate};
use shared::types::OnboardingState;
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct OnboardingRepository {
    base: BaseRepository,
}

impl OnboardingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn record_id(employee_id: &str) -> RecordId {
        let key = employee_id.trim_start_matches("employee:");
        RecordId::from_table_key("onboarding_status", key)
    }

    /// Fetch the employee's status, creating an InProgress document on the
    /// first visit
    pub async fn get_or_create(&self, employee_id: &str) -> RepoResult<OnboardingStatus> {
        if let Some(existing) = self.find(employee_id).await? {
            return Ok(existing);
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPSERT $thing CONTENT {
                    employee_id: $employee_id,
                    status: 'IN_PROGRESS',
                    video_watched: false,
                    quiz_score: NONE,
                    completed_at: NONE
                } RETURN AFTER"#,
            )
            .bind(("thing", Self::record_id(employee_id)))
            .bind(("employee_id", employee_id.to_string()))
            .await?;

        result
            .take::<Option<OnboardingStatus>>(0)?
            .ok_or_else(|| RepoError::Database("Failed to create onboarding status".to_string()))
    }

    /// Fetch without creating
    pub async fn find(&self, employee_id: &str) -> RepoResult<Option<OnboardingStatus>> {
        let status: Option<OnboardingStatus> =
            self.base.db().select(Self::record_id(employee_id)).await?;
        Ok(status)
    }

    /// Merge wizard progress into the document.
    ///
    /// Flipping the status to Completed stamps `completed_at` once; the
    /// timestamp survives later updates.
    pub async fn update(
        &self,
        employee_id: &str,
        data: OnboardingUpdate,
    ) -> RepoResult<OnboardingStatus> {
        // Ensure the document exists before merging
        self.get_or_create(employee_id).await?;

        let completing = data.status == Some(OnboardingState::Completed);

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = $status OR status,
                    video_watched = IF $has_video THEN $video_watched ELSE video_watched END,
                    quiz_score = IF $has_score THEN $quiz_score ELSE quiz_score END,
                    completed_at = IF $completing AND completed_at = NONE THEN $now ELSE completed_at END
                RETURN AFTER"#,
            )
            .bind(("thing", Self::record_id(employee_id)))
            .bind(("status", data.status))
            .bind(("has_video", data.video_watched.is_some()))
            .bind(("video_watched", data.video_watched))
            .bind(("has_score", data.quiz_score.is_some()))
            .bind(("quiz_score", data.quiz_score))
            .bind(("completing", completing))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<OnboardingStatus>>(0)?
            .ok_or_else(|| RepoError::Database("Failed to update onboarding status".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_first_touch_creates_in_progress() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = OnboardingRepository::new(svc.db.clone());

        let status = repo.get_or_create("employee:a").await.unwrap();
        assert_eq!(status.status, OnboardingState::InProgress);
        assert!(!status.video_watched);
        assert!(status.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_completion_stamps_timestamp_once() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = OnboardingRepository::new(svc.db.clone());

        let done = repo
            .update(
                "employee:a",
                OnboardingUpdate {
                    status: Some(OnboardingState::Completed),
                    video_watched: Some(true),
                    quiz_score: Some(75.0),
                },
            )
            .await
            .unwrap();
        assert_eq!(done.status, OnboardingState::Completed);
        let first_stamp = done.completed_at;
        assert!(first_stamp.is_some());

        // Retaking the quiz overwrites the score but not the completion stamp
        let retaken = repo
            .update(
                "employee:a",
                OnboardingUpdate {
                    status: None,
                    video_watched: None,
                    quiz_score: Some(100.0),
                },
            )
            .await
            .unwrap();
        assert_eq!(retaken.quiz_score, Some(100.0));
        assert_eq!(retaken.completed_at, first_stamp);
    }
}
