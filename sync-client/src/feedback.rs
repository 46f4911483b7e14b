//! Feedback filter controller
//!
//! Translates the dashboard's filter selection into exactly one summary
//! request, and guards the view against out-of-order responses: every fetch
//! gets a monotonically increasing generation, and only the latest issued
//! generation may update the view.

use chrono::{Datelike, NaiveDate};

use crate::ClientError;
use shared::client::{FeedbackSummaryQuery, FeedbackSummaryResponse, GraphData, TimeseriesPoint};
use shared::types::TimeFrame;

/// The user's filter selection
#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    pub mode: Option<TimeFrame>,
    /// daily / specific
    pub date: Option<NaiveDate>,
    /// monthly: (year, month)
    pub month: Option<(i32, u32)>,
    /// range bounds, inclusive
    pub range_start: Option<NaiveDate>,
    pub range_end: Option<NaiveDate>,
}

impl FeedbackFilter {
    /// Whether "Apply" should be enabled for the current selection.
    ///
    /// Range needs both bounds, distinct and ordered; single-date modes
    /// need their date; full is always applicable.
    pub fn can_apply(&self) -> bool {
        match self.mode {
            None => false,
            Some(TimeFrame::Daily) | Some(TimeFrame::Specific) => self.date.is_some(),
            Some(TimeFrame::Monthly) => self.month.is_some(),
            Some(TimeFrame::Range) => match (self.range_start, self.range_end) {
                (Some(start), Some(end)) => start < end,
                _ => false,
            },
            Some(TimeFrame::Full) => true,
        }
    }

    /// Build the single summary request for this selection.
    ///
    /// Monthly always requests the first calendar day of the chosen month.
    pub fn to_query(&self, employee_id: &str) -> Option<FeedbackSummaryQuery> {
        if !self.can_apply() {
            return None;
        }
        let mode = self.mode?;

        let (date, start_date, end_date) = match mode {
            TimeFrame::Daily | TimeFrame::Specific => {
                (Some(format_date(self.date?)), None, None)
            }
            TimeFrame::Monthly => {
                let (year, month) = self.month?;
                let first = NaiveDate::from_ymd_opt(year, month, 1)?;
                (Some(format_date(first)), None, None)
            }
            TimeFrame::Range => (
                None,
                Some(format_date(self.range_start?)),
                Some(format_date(self.range_end?)),
            ),
            TimeFrame::Full => (None, None, None),
        };

        Some(FeedbackSummaryQuery {
            employee_id: employee_id.to_string(),
            time_frame: mode,
            date,
            start_date,
            end_date,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month(),
        date.day()
    )
}

/// What the summary view is currently showing
#[derive(Debug, Clone)]
pub enum SummaryState {
    Idle,
    Loading,
    /// Zero entries in the window — an explicit no-data state
    NoData,
    SinglePoint {
        total: i64,
        graph: GraphData,
        response: FeedbackSummaryResponse,
    },
    Timeseries {
        total: i64,
        series: Vec<TimeseriesPoint>,
        response: FeedbackSummaryResponse,
    },
    /// Page-level error; no partial or stale data is shown
    Error(String),
}

/// View controller for the summary panel
#[derive(Debug)]
pub struct FeedbackController {
    issued: u64,
    state: SummaryState,
}

impl Default for FeedbackController {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackController {
    pub fn new() -> Self {
        Self {
            issued: 0,
            state: SummaryState::Idle,
        }
    }

    pub fn state(&self) -> &SummaryState {
        &self.state
    }

    /// Start a fetch: bumps the generation and flips the view to Loading.
    /// The returned generation must come back with the response.
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.state = SummaryState::Loading;
        self.issued
    }

    /// Apply a finished fetch. A response whose generation is not the
    /// latest issued is discarded — a slow early response must not
    /// overwrite a fresher one. Returns whether the view changed.
    pub fn apply(
        &mut self,
        generation: u64,
        result: Result<FeedbackSummaryResponse, ClientError>,
    ) -> bool {
        if generation != self.issued {
            tracing::debug!(
                generation,
                latest = self.issued,
                "Discarding superseded summary response"
            );
            return false;
        }

        self.state = match result {
            Err(e) => SummaryState::Error(e.to_string()),
            Ok(response) if response.total == 0 => SummaryState::NoData,
            Ok(response) => {
                if let Some(graph) = response.graph_data.clone() {
                    SummaryState::SinglePoint {
                        total: response.total,
                        graph,
                        response,
                    }
                } else if let Some(series) = response.graph_timeseries.clone() {
                    SummaryState::Timeseries {
                        total: response.total,
                        series,
                        response,
                    }
                } else {
                    // Non-empty total with neither graph field is a
                    // contract violation
                    SummaryState::Error("Malformed summary response".to_string())
                }
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn response(total: i64, graph: Option<GraphData>) -> FeedbackSummaryResponse {
        FeedbackSummaryResponse {
            total,
            graph_data: graph,
            graph_timeseries: None,
            positive_feedback: Vec::new(),
            improvement_areas: Vec::new(),
        }
    }

    #[test]
    fn test_range_apply_gating() {
        let mut filter = FeedbackFilter {
            mode: Some(TimeFrame::Range),
            ..Default::default()
        };
        assert!(!filter.can_apply());

        filter.range_start = Some(date(2024, 3, 1));
        assert!(!filter.can_apply());

        // equal bounds stay disabled
        filter.range_end = Some(date(2024, 3, 1));
        assert!(!filter.can_apply());

        filter.range_end = Some(date(2024, 3, 10));
        assert!(filter.can_apply());
    }

    #[test]
    fn test_monthly_requests_first_of_month() {
        let filter = FeedbackFilter {
            mode: Some(TimeFrame::Monthly),
            month: Some((2024, 3)),
            ..Default::default()
        };
        let query = filter.to_query("employee:a").unwrap();
        assert_eq!(query.date.as_deref(), Some("2024-03-01"));
        assert_eq!(query.time_frame, TimeFrame::Monthly);
    }

    #[test]
    fn test_full_needs_no_dates() {
        let filter = FeedbackFilter {
            mode: Some(TimeFrame::Full),
            ..Default::default()
        };
        let query = filter.to_query("employee:a").unwrap();
        assert!(query.date.is_none());
        assert!(query.start_date.is_none());
        assert!(query.end_date.is_none());
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut controller = FeedbackController::new();

        let first = controller.begin();
        let second = controller.begin();

        // The newer fetch resolves first
        assert!(controller.apply(
            second,
            Ok(response(
                5,
                Some(GraphData {
                    avg_understanding: 4.0,
                    avg_instructor: 4.5,
                })
            )),
        ));

        // The slow earlier response must not overwrite it
        assert!(!controller.apply(first, Ok(response(1, None))));

        match controller.state() {
            SummaryState::SinglePoint { total, .. } => assert_eq!(*total, 5),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_zero_total_renders_no_data() {
        let mut controller = FeedbackController::new();
        let generation = controller.begin();
        controller.apply(generation, Ok(response(0, None)));
        assert!(matches!(controller.state(), SummaryState::NoData));
    }

    #[test]
    fn test_error_replaces_view() {
        let mut controller = FeedbackController::new();
        let generation = controller.begin();
        controller.apply(
            generation,
            Err(ClientError::Internal("boom".to_string())),
        );
        assert!(matches!(controller.state(), SummaryState::Error(_)));
    }
}
