//! Employee API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{EmployeeCreate, EmployeeUpdate};
use crate::db::repository::EmployeeRepository;
use crate::utils::{AppError, AppResult};
use shared::client::EmployeeView;

const RESOURCE: &str = "employee";

/// List all active employees
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<EmployeeView>>> {
    let repo = EmployeeRepository::new(state.get_db());
    let employees = repo.find_all().await.map_err(AppError::from)?;
    Ok(Json(employees.iter().map(|e| e.to_view()).collect()))
}

/// List all employees including deactivated (admin console)
pub async fn list_with_inactive(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<EmployeeView>>> {
    let repo = EmployeeRepository::new(state.get_db());
    let employees = repo
        .find_all_with_inactive()
        .await
        .map_err(AppError::from)?;
    Ok(Json(employees.iter().map(|e| e.to_view()).collect()))
}

/// Get employee by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<EmployeeView>> {
    let repo = EmployeeRepository::new(state.get_db());
    let employee = repo
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Employee {} not found", id)))?;
    Ok(Json(employee.to_view()))
}

/// Create a new employee (admin)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<EmployeeView>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = EmployeeRepository::new(state.get_db());
    let employee = repo.create(payload).await.map_err(AppError::from)?;

    let view = employee.to_view();
    state
        .broadcast_sync(RESOURCE, "created", &view.id, Some(&view))
        .await;

    Ok(Json(view))
}

/// Update an employee — self profile edit, or any employee for admins
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<EmployeeView>> {
    if !user.is_admin() && user.id != id {
        return Err(AppError::forbidden(
            "Cannot edit another employee's profile".to_string(),
        ));
    }
    // Only admins may deactivate
    if payload.is_active.is_some() && !user.is_admin() {
        return Err(AppError::forbidden(
            "Only admins can change the active flag".to_string(),
        ));
    }

    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = EmployeeRepository::new(state.get_db());
    let employee = repo.update(&id, payload).await.map_err(AppError::from)?;

    let view = employee.to_view();
    state
        .broadcast_sync(RESOURCE, "updated", &id, Some(&view))
        .await;

    Ok(Json(view))
}

/// Mark the caller's first-time setup as finished
pub async fn setup_complete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<EmployeeView>> {
    let repo = EmployeeRepository::new(state.get_db());
    let employee = repo
        .set_setup_complete(&user.id)
        .await
        .map_err(AppError::from)?;

    let view = employee.to_view();
    state
        .broadcast_sync(RESOURCE, "updated", &user.id, Some(&view))
        .await;

    Ok(Json(view))
}
