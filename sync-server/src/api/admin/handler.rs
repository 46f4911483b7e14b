//! Admin Console Handlers
//!
//! Role promotion and employee deletion. Both used to live in external
//! serverless functions; here they are plain admin-gated endpoints.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::EmployeeRepository;
use crate::utils::{AppError, AppResult};
use shared::client::{EmployeeView, PromoteRequest};

const RESOURCE: &str = "employee";

/// POST /api/admin/promote — grant the admin role by email
///
/// The new claim takes effect when the employee next logs in.
pub async fn promote(
    State(state): State<ServerState>,
    Json(payload): Json<PromoteRequest>,
) -> AppResult<Json<EmployeeView>> {
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("Invalid email format"));
    }

    let repo = EmployeeRepository::new(state.get_db());
    let employee = repo
        .find_by_email(email)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("No employee with email {email}")))?;

    let id = employee
        .id
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_default();
    let promoted = repo.set_admin(&id).await.map_err(AppError::from)?;

    tracing::info!(employee = %id, email = %email, "Employee promoted to admin");

    let view = promoted.to_view();
    state
        .broadcast_sync(RESOURCE, "updated", &id, Some(&view))
        .await;

    Ok(Json(view))
}

/// DELETE /api/admin/employees/{id}
///
/// Deletes the employee document and cascades to their attendance and
/// onboarding documents.
pub async fn delete_employee(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = EmployeeRepository::new(state.get_db());
    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        tracing::info!(employee = %id, "Employee deleted");
        state
            .broadcast_sync::<()>(RESOURCE, "deleted", &id, None)
            .await;
    }

    Ok(Json(result))
}
