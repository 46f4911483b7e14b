//! Onboarding API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::OnboardingUpdate;
use crate::db::repository::OnboardingRepository;
use crate::utils::{AppError, AppResult};
use shared::client::OnboardingStatusView;

fn check_access(user: &CurrentUser, employee_id: &str) -> AppResult<()> {
    if !user.is_admin() && user.id != employee_id {
        return Err(AppError::forbidden(
            "Cannot access another employee's onboarding".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/onboarding/{employee_id}
///
/// First visit creates the document as InProgress.
pub async fn get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(employee_id): Path<String>,
) -> AppResult<Json<OnboardingStatusView>> {
    check_access(&user, &employee_id)?;

    let repo = OnboardingRepository::new(state.get_db());
    let status = repo
        .get_or_create(&employee_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(status.to_view()))
}

/// PUT /api/onboarding/{employee_id} — merge wizard progress
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(employee_id): Path<String>,
    Json(payload): Json<OnboardingUpdate>,
) -> AppResult<Json<OnboardingStatusView>> {
    check_access(&user, &employee_id)?;

    if let Some(score) = payload.quiz_score
        && !(0.0..=100.0).contains(&score)
    {
        return Err(AppError::validation("Quiz score must be 0-100"));
    }

    let repo = OnboardingRepository::new(state.get_db());
    let status = repo
        .update(&employee_id, payload)
        .await
        .map_err(AppError::from)?;

    let view = status.to_view();
    state
        .broadcast_sync("onboarding_status", "updated", &employee_id, Some(&view))
        .await;

    Ok(Json(view))
}
