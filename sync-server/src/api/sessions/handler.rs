//! Session API Handlers
//!
//! Thin wrappers over the [`SessionManager`]; all transition rules live
//! there.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::client::{MarkAttendanceRequest, RosterEntry, ScheduleRequest, SessionView};
use shared::types::SessionKind;

fn parse_kind(kind: &str) -> AppResult<SessionKind> {
    kind.parse().map_err(AppError::validation)
}

/// GET /api/sessions/{kind}/today
pub async fn today(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(kind): Path<String>,
) -> AppResult<Json<Option<SessionView>>> {
    let kind = parse_kind(&kind)?;
    let view = state.sessions.today(kind, user.is_admin()).await?;
    Ok(Json(view))
}

/// GET /api/sessions/{kind}/{date}
pub async fn get_by_date(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((kind, date)): Path<(String, String)>,
) -> AppResult<Json<SessionView>> {
    let kind = parse_kind(&kind)?;
    let view = state
        .sessions
        .view(kind, &date, user.is_admin())
        .await?
        .ok_or_else(|| AppError::not_found(format!("No session on {date}")))?;
    Ok(Json(view))
}

/// POST /api/sessions/{kind}/schedule (admin)
pub async fn schedule(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(kind): Path<String>,
    Json(payload): Json<ScheduleRequest>,
) -> AppResult<Json<SessionView>> {
    let kind = parse_kind(&kind)?;
    let view = state
        .sessions
        .schedule(kind, &payload.date, &payload.time, &user.id)
        .await?;
    Ok(Json(view))
}

/// POST /api/sessions/{kind}/{date}/start (admin)
pub async fn start(
    State(state): State<ServerState>,
    Path((kind, date)): Path<(String, String)>,
) -> AppResult<Json<SessionView>> {
    let kind = parse_kind(&kind)?;
    let view = state.sessions.start(kind, &date).await?;
    Ok(Json(view))
}

/// POST /api/sessions/{kind}/{date}/attendance (admin, active session)
pub async fn mark_attendance(
    State(state): State<ServerState>,
    Path((kind, date)): Path<(String, String)>,
    Json(payload): Json<MarkAttendanceRequest>,
) -> AppResult<Json<()>> {
    let kind = parse_kind(&kind)?;
    state
        .sessions
        .set_attendance(
            kind,
            &date,
            &payload.employee_id,
            payload.status,
            payload.reason,
        )
        .await?;
    Ok(Json(()))
}

/// POST /api/sessions/{kind}/{date}/stop (admin)
pub async fn stop(
    State(state): State<ServerState>,
    Path((kind, date)): Path<(String, String)>,
) -> AppResult<Json<SessionView>> {
    let kind = parse_kind(&kind)?;
    let view = state.sessions.stop(kind, &date).await?;
    Ok(Json(view))
}

/// PUT /api/sessions/{kind}/{date}/attendance (admin, ended standups only)
pub async fn edit_attendance(
    State(state): State<ServerState>,
    Path((kind, date)): Path<(String, String)>,
    Json(payload): Json<MarkAttendanceRequest>,
) -> AppResult<Json<RosterEntry>> {
    let kind = parse_kind(&kind)?;
    let entry = state
        .sessions
        .edit_ended_attendance(
            kind,
            &date,
            &payload.employee_id,
            payload.status,
            payload.reason,
        )
        .await?;
    Ok(Json(entry))
}
