//! HTTP gateway
//!
//! Typed call wrappers over the server API. Every response is parsed into an
//! explicit schema struct at this boundary; a shape mismatch surfaces as
//! [`ClientError::Decode`] instead of leaking loose JSON into the app.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::{ClientConfig, ClientError, ClientResult};
use shared::client::{
    EmployeeView, FeedbackSummaryQuery, FeedbackSummaryResponse, FeedbackSubmit, LoginRequest,
    LoginResponse, MarkAttendanceRequest, OnboardingStatusView, PromoteRequest, RosterEntry,
    ScheduleRequest, SessionView, UserInfo,
};
use shared::types::{AttendanceStatus, OnboardingState, SessionKind};

/// HTTP client for the sync-server API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        }
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // ========== Request plumbing ==========

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.get(self.url(path));
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        Self::handle_response(request.send().await?).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        Self::handle_response(request.send().await?).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.post(self.url(path));
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        Self::handle_response(request.send().await?).await
    }

    async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut request = self.client.put(self.url(path)).json(body);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        Self::handle_response(request.send().await?).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.delete(self.url(path));
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        Self::handle_response(request.send().await?).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(text))
                }
                _ => Err(ClientError::Internal(text)),
            };
        }

        // Parse into the expected schema; anything else is a decode error
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    // ========== Auth API ==========

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        self.post(
            "/api/auth/login",
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    pub async fn me(&self) -> ClientResult<UserInfo> {
        self.get("/api/auth/me").await
    }

    // ========== Employee API ==========

    pub async fn employees(&self) -> ClientResult<Vec<EmployeeView>> {
        self.get("/api/employees").await
    }

    pub async fn employee(&self, id: &str) -> ClientResult<EmployeeView> {
        self.get(&format!("/api/employees/{id}")).await
    }

    pub async fn update_employee<B: serde::Serialize>(
        &self,
        id: &str,
        update: &B,
    ) -> ClientResult<EmployeeView> {
        self.put(&format!("/api/employees/{id}"), update).await
    }

    pub async fn complete_setup(&self) -> ClientResult<EmployeeView> {
        self.post_empty("/api/employees/setup-complete").await
    }

    // ========== Admin API ==========

    pub async fn promote(&self, email: &str) -> ClientResult<EmployeeView> {
        self.post(
            "/api/admin/promote",
            &PromoteRequest {
                email: email.to_string(),
            },
        )
        .await
    }

    pub async fn delete_employee(&self, id: &str) -> ClientResult<bool> {
        self.delete(&format!("/api/admin/employees/{id}")).await
    }

    // ========== Session API ==========

    pub async fn session_today(&self, kind: SessionKind) -> ClientResult<Option<SessionView>> {
        self.get(&format!("/api/sessions/{kind}/today")).await
    }

    pub async fn session(&self, kind: SessionKind, date: &str) -> ClientResult<SessionView> {
        self.get(&format!("/api/sessions/{kind}/{date}")).await
    }

    pub async fn schedule_session(
        &self,
        kind: SessionKind,
        date: &str,
        time: &str,
    ) -> ClientResult<SessionView> {
        self.post(
            &format!("/api/sessions/{kind}/schedule"),
            &ScheduleRequest {
                date: date.to_string(),
                time: time.to_string(),
            },
        )
        .await
    }

    pub async fn start_session(&self, kind: SessionKind, date: &str) -> ClientResult<SessionView> {
        self.post_empty(&format!("/api/sessions/{kind}/{date}/start"))
            .await
    }

    pub async fn mark_attendance(
        &self,
        kind: SessionKind,
        date: &str,
        employee_id: &str,
        status: AttendanceStatus,
        reason: Option<String>,
    ) -> ClientResult<()> {
        self.post(
            &format!("/api/sessions/{kind}/{date}/attendance"),
            &MarkAttendanceRequest {
                employee_id: employee_id.to_string(),
                status,
                reason,
            },
        )
        .await
    }

    pub async fn stop_session(&self, kind: SessionKind, date: &str) -> ClientResult<SessionView> {
        self.post_empty(&format!("/api/sessions/{kind}/{date}/stop"))
            .await
    }

    pub async fn edit_attendance(
        &self,
        kind: SessionKind,
        date: &str,
        employee_id: &str,
        status: AttendanceStatus,
        reason: Option<String>,
    ) -> ClientResult<RosterEntry> {
        self.put(
            &format!("/api/sessions/{kind}/{date}/attendance"),
            &MarkAttendanceRequest {
                employee_id: employee_id.to_string(),
                status,
                reason,
            },
        )
        .await
    }

    // ========== Feedback API ==========

    pub async fn submit_feedback(&self, entry: &FeedbackSubmit) -> ClientResult<serde_json::Value> {
        self.post("/api/feedback", entry).await
    }

    pub async fn feedback_summary(
        &self,
        query: &FeedbackSummaryQuery,
    ) -> ClientResult<FeedbackSummaryResponse> {
        let mut path = format!(
            "/api/feedback/summary?employeeId={}&timeFrame={}",
            query.employee_id, query.time_frame
        );
        if let Some(date) = &query.date {
            path.push_str(&format!("&date={date}"));
        }
        if let Some(start) = &query.start_date {
            path.push_str(&format!("&startDate={start}"));
        }
        if let Some(end) = &query.end_date {
            path.push_str(&format!("&endDate={end}"));
        }
        self.get(&path).await
    }

    // ========== Onboarding API ==========

    pub async fn onboarding(&self, employee_id: &str) -> ClientResult<OnboardingStatusView> {
        self.get(&format!("/api/onboarding/{employee_id}")).await
    }

    pub async fn update_onboarding(
        &self,
        employee_id: &str,
        status: Option<OnboardingState>,
        video_watched: Option<bool>,
        quiz_score: Option<f64>,
    ) -> ClientResult<OnboardingStatusView> {
        #[derive(serde::Serialize)]
        struct Update {
            #[serde(skip_serializing_if = "Option::is_none")]
            status: Option<OnboardingState>,
            #[serde(skip_serializing_if = "Option::is_none")]
            video_watched: Option<bool>,
            #[serde(skip_serializing_if = "Option::is_none")]
            quiz_score: Option<f64>,
        }
        self.put(
            &format!("/api/onboarding/{employee_id}"),
            &Update {
                status,
                video_watched,
                quiz_score,
            },
        )
        .await
    }
}
