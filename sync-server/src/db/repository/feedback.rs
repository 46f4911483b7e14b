//! Feedback Repository
//!
//! Stores per-entry feedback and serves the windowed aggregates behind the
//! summary endpoint. Date keys are `yyyy-MM-dd` strings, which order
//! lexicographically, so window bounds are plain string comparisons.

use serde::Deserialize;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{FeedbackCreate, FeedbackEntry, Sentiment};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// One day's averages inside an aggregation window
#[derive(Debug, Clone, Deserialize)]
pub struct DayAggregate {
    pub label: String,
    pub avg_understanding: f64,
    pub avg_instructor: f64,
    pub count: i64,
}

#[derive(Clone)]
pub struct FeedbackRepository {
    base: BaseRepository,
}

impl FeedbackRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Store one feedback entry.
    ///
    /// Entries carrying a suggestion are filed as improvement feedback,
    /// the rest as positive.
    pub async fn create(&self, data: FeedbackCreate) -> RepoResult<FeedbackEntry> {
        let sentiment = if data.suggestion.is_some() {
            Sentiment::Improvement
        } else {
            Sentiment::Positive
        };

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE feedback SET
                    employee_id = $employee_id,
                    session_date = $session_date,
                    understanding = $understanding,
                    instructor = $instructor,
                    comment = $comment,
                    sentiment = $sentiment,
                    tags = $tags,
                    suggestion = $suggestion,
                    submitted_at = $submitted_at
                RETURN AFTER"#,
            )
            .bind(("employee_id", data.employee_id))
            .bind(("session_date", data.session_date))
            .bind(("understanding", data.understanding))
            .bind(("instructor", data.instructor))
            .bind(("comment", data.comment))
            .bind(("sentiment", sentiment))
            .bind(("tags", data.tags))
            .bind(("suggestion", data.suggestion))
            .bind(("submitted_at", now_millis()))
            .await?;

        let created: Option<FeedbackEntry> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create feedback".to_string()))
    }

    /// Per-day averages for one employee in an inclusive date window.
    ///
    /// `None` bounds mean the full history.
    pub async fn aggregate_by_day(
        &self,
        employee_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> RepoResult<Vec<DayAggregate>> {
        let query = if start_date.is_some() {
            r#"SELECT
                session_date AS label,
                math::mean(understanding) AS avg_understanding,
                math::mean(instructor) AS avg_instructor,
                count() AS count
            FROM feedback
            WHERE employee_id = $employee_id
                AND session_date >= $start
                AND session_date <= $end
            GROUP BY label
            ORDER BY label"#
        } else {
            r#"SELECT
                session_date AS label,
                math::mean(understanding) AS avg_understanding,
                math::mean(instructor) AS avg_instructor,
                count() AS count
            FROM feedback
            WHERE employee_id = $employee_id
            GROUP BY label
            ORDER BY label"#
        };

        let mut result = self
            .base
            .db()
            .query(query)
            .bind(("employee_id", employee_id.to_string()))
            .bind(("start", start_date.map(str::to_string)))
            .bind(("end", end_date.map(str::to_string)))
            .await?;

        let days: Vec<DayAggregate> = result.take(0)?;
        Ok(days)
    }

    /// All entries for one employee in an inclusive date window, newest first
    pub async fn find_in_window(
        &self,
        employee_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> RepoResult<Vec<FeedbackEntry>> {
        let query = if start_date.is_some() {
            r#"SELECT * FROM feedback
            WHERE employee_id = $employee_id
                AND session_date >= $start
                AND session_date <= $end
            ORDER BY submitted_at DESC"#
        } else {
            r#"SELECT * FROM feedback
            WHERE employee_id = $employee_id
            ORDER BY submitted_at DESC"#
        };

        let mut result = self
            .base
            .db()
            .query(query)
            .bind(("employee_id", employee_id.to_string()))
            .bind(("start", start_date.map(str::to_string)))
            .bind(("end", end_date.map(str::to_string)))
            .await?;

        let entries: Vec<FeedbackEntry> = result.take(0)?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn entry(date: &str, understanding: f64, suggestion: Option<&str>) -> FeedbackCreate {
        FeedbackCreate {
            employee_id: "employee:a".to_string(),
            session_date: date.to_string(),
            understanding,
            instructor: 4.0,
            comment: "clear walkthrough of the deployment flow".to_string(),
            tags: vec!["clarity".to_string()],
            suggestion: suggestion.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_sentiment_from_suggestion() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = FeedbackRepository::new(svc.db.clone());

        let positive = repo.create(entry("2024-03-01", 4.0, None)).await.unwrap();
        assert_eq!(positive.sentiment, Sentiment::Positive);

        let improvement = repo
            .create(entry("2024-03-01", 2.0, Some("slow down on demos")))
            .await
            .unwrap();
        assert_eq!(improvement.sentiment, Sentiment::Improvement);
    }

    #[tokio::test]
    async fn test_aggregate_by_day_groups_and_orders() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = FeedbackRepository::new(svc.db.clone());

        repo.create(entry("2024-03-02", 4.0, None)).await.unwrap();
        repo.create(entry("2024-03-01", 3.0, None)).await.unwrap();
        repo.create(entry("2024-03-01", 5.0, None)).await.unwrap();

        let days = repo
            .aggregate_by_day("employee:a", Some("2024-03-01"), Some("2024-03-31"))
            .await
            .unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].label, "2024-03-01");
        assert_eq!(days[0].count, 2);
        assert!((days[0].avg_understanding - 4.0).abs() < f64::EPSILON);
        assert_eq!(days[1].label, "2024-03-02");
    }

    #[tokio::test]
    async fn test_empty_window_yields_no_rows() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = FeedbackRepository::new(svc.db.clone());

        repo.create(entry("2024-03-01", 4.0, None)).await.unwrap();

        let days = repo
            .aggregate_by_day("employee:a", Some("2024-04-01"), Some("2024-04-30"))
            .await
            .unwrap();
        assert!(days.is_empty());
    }
}
