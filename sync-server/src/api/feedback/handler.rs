//! Feedback API Handlers
//!
//! One aggregation request per filter window. The response shape
//! bifurcates: single-point windows get `graph_data`, multi-point windows
//! get `graph_timeseries`, never both.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{FeedbackCreate, FeedbackEntry, Sentiment};
use crate::db::repository::FeedbackRepository;
use crate::db::repository::feedback::DayAggregate;
use crate::utils::{AppError, AppResult, time};
use shared::client::{
    FeedbackSummaryResponse, GraphData, ImprovementArea, PositiveFeedback, TimeseriesPoint,
};
use shared::types::TimeFrame;

/// Cap on the quote/theme lists in a summary
const MAX_HIGHLIGHTS: usize = 10;

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(rename = "employeeId")]
    pub employee_id: String,
    #[serde(rename = "timeFrame")]
    pub time_frame: TimeFrame,
    pub date: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

// ============================================================================
// Window Resolution
// ============================================================================

/// Resolve the filter selection into inclusive date bounds.
///
/// `None` means the whole history (`full`).
fn resolve_window(query: &SummaryQuery) -> AppResult<Option<(String, String)>> {
    match query.time_frame {
        TimeFrame::Daily | TimeFrame::Specific => {
            let date = query
                .date
                .as_deref()
                .ok_or_else(|| AppError::validation("Date is required for this time frame"))?;
            time::parse_date(date)?;
            Ok(Some((date.to_string(), date.to_string())))
        }
        TimeFrame::Monthly => {
            let date = query
                .date
                .as_deref()
                .ok_or_else(|| AppError::validation("Date is required for this time frame"))?;
            let parsed = time::parse_date(date)?;
            // Clients send the first of the month; normalize regardless
            let first = time::first_of_month(parsed);
            let next = time::first_of_next_month(first);
            let last = next.pred_opt().unwrap_or(first);
            Ok(Some((
                first.format("%Y-%m-%d").to_string(),
                last.format("%Y-%m-%d").to_string(),
            )))
        }
        TimeFrame::Range => {
            let (Some(start), Some(end)) = (query.start_date.as_deref(), query.end_date.as_deref())
            else {
                return Err(AppError::validation(
                    "Range requires both start and end dates",
                ));
            };
            let start_parsed = time::parse_date(start)?;
            let end_parsed = time::parse_date(end)?;
            if start_parsed >= end_parsed {
                return Err(AppError::validation(
                    "Range start must be before range end",
                ));
            }
            Ok(Some((start.to_string(), end.to_string())))
        }
        TimeFrame::Full => Ok(None),
    }
}

// ============================================================================
// Summary Assembly
// ============================================================================

fn single_point(days: &[DayAggregate]) -> GraphData {
    let total: i64 = days.iter().map(|d| d.count).sum();
    if total == 0 {
        return GraphData {
            avg_understanding: 0.0,
            avg_instructor: 0.0,
        };
    }
    let sum_u: f64 = days
        .iter()
        .map(|d| d.avg_understanding * d.count as f64)
        .sum();
    let sum_i: f64 = days
        .iter()
        .map(|d| d.avg_instructor * d.count as f64)
        .sum();
    GraphData {
        avg_understanding: sum_u / total as f64,
        avg_instructor: sum_i / total as f64,
    }
}

fn highlights(entries: &[FeedbackEntry]) -> (Vec<PositiveFeedback>, Vec<ImprovementArea>) {
    let positive = entries
        .iter()
        .filter(|e| e.sentiment == Sentiment::Positive)
        .take(MAX_HIGHLIGHTS)
        .map(|e| PositiveFeedback {
            quote: e.comment.clone(),
            keywords: e.tags.clone(),
        })
        .collect();

    let improvement = entries
        .iter()
        .filter(|e| e.sentiment == Sentiment::Improvement)
        .take(MAX_HIGHLIGHTS)
        .map(|e| ImprovementArea {
            theme: e
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| "general".to_string()),
            suggestion: e
                .suggestion
                .clone()
                .unwrap_or_else(|| e.comment.clone()),
        })
        .collect();

    (positive, improvement)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/feedback/summary
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<FeedbackSummaryResponse>> {
    let window = resolve_window(&query)?;
    let (start, end) = match &window {
        Some((s, e)) => (Some(s.as_str()), Some(e.as_str())),
        None => (None, None),
    };

    tracing::debug!(
        employee = %query.employee_id,
        time_frame = %query.time_frame,
        start = ?start,
        end = ?end,
        "Fetching feedback summary"
    );

    let repo = FeedbackRepository::new(state.get_db());
    let days = repo
        .aggregate_by_day(&query.employee_id, start, end)
        .await
        .map_err(AppError::from)?;

    let total: i64 = days.iter().map(|d| d.count).sum();

    // Zero feedback in the window: an explicit no-data response with
    // neither graph field, not a zero-valued chart
    if total == 0 {
        return Ok(Json(FeedbackSummaryResponse {
            total: 0,
            graph_data: None,
            graph_timeseries: None,
            positive_feedback: Vec::new(),
            improvement_areas: Vec::new(),
        }));
    }

    let entries = repo
        .find_in_window(&query.employee_id, start, end)
        .await
        .map_err(AppError::from)?;
    let (positive_feedback, improvement_areas) = highlights(&entries);

    let (graph_data, graph_timeseries) = if query.time_frame.is_single_point() {
        (Some(single_point(&days)), None)
    } else {
        let series = days
            .into_iter()
            .map(|d| TimeseriesPoint {
                label: d.label,
                avg_understanding: d.avg_understanding,
                avg_instructor: d.avg_instructor,
                count: d.count,
            })
            .collect();
        (None, Some(series))
    };

    Ok(Json(FeedbackSummaryResponse {
        total,
        graph_data,
        graph_timeseries,
        positive_feedback,
        improvement_areas,
    }))
}

/// POST /api/feedback — submit one entry
pub async fn submit(
    State(state): State<ServerState>,
    Json(payload): Json<FeedbackCreate>,
) -> AppResult<Json<FeedbackEntry>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    time::parse_date(&payload.session_date)?;

    let repo = FeedbackRepository::new(state.get_db());
    let entry = repo.create(payload).await.map_err(AppError::from)?;
    Ok(Json(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(time_frame: TimeFrame) -> SummaryQuery {
        SummaryQuery {
            employee_id: "employee:a".to_string(),
            time_frame,
            date: None,
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn test_monthly_normalizes_to_first_of_month() {
        let mut q = query(TimeFrame::Monthly);
        q.date = Some("2024-03-15".to_string());
        let window = resolve_window(&q).unwrap().unwrap();
        assert_eq!(window.0, "2024-03-01");
        assert_eq!(window.1, "2024-03-31");
    }

    #[test]
    fn test_range_requires_distinct_bounds() {
        let mut q = query(TimeFrame::Range);
        q.start_date = Some("2024-03-01".to_string());
        q.end_date = Some("2024-03-01".to_string());
        assert!(resolve_window(&q).is_err());

        q.end_date = None;
        assert!(resolve_window(&q).is_err());

        q.start_date = Some("2024-03-01".to_string());
        q.end_date = Some("2024-03-10".to_string());
        let window = resolve_window(&q).unwrap().unwrap();
        assert_eq!(window, ("2024-03-01".to_string(), "2024-03-10".to_string()));
    }

    #[test]
    fn test_full_has_no_bounds() {
        assert_eq!(resolve_window(&query(TimeFrame::Full)).unwrap(), None);
    }

    #[test]
    fn test_single_point_is_count_weighted() {
        let days = vec![
            DayAggregate {
                label: "2024-03-01".to_string(),
                avg_understanding: 4.0,
                avg_instructor: 4.0,
                count: 3,
            },
            DayAggregate {
                label: "2024-03-02".to_string(),
                avg_understanding: 2.0,
                avg_instructor: 3.0,
                count: 1,
            },
        ];
        let point = single_point(&days);
        assert!((point.avg_understanding - 3.5).abs() < 1e-9);
        assert!((point.avg_instructor - 3.75).abs() < 1e-9);
    }
}
