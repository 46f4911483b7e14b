//! Authentication Handlers

use std::time::Duration;

use axum::{Extension, Json, extract::State};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::EmployeeRepository;
use crate::utils::{AppError, AppResult};
use shared::client::{LoginRequest, LoginResponse, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/login
///
/// Verifies credentials and returns a JWT whose claims carry the admin
/// role. A unified error message covers both unknown users and wrong
/// passwords.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let repo = EmployeeRepository::new(state.get_db());
    let employee = repo
        .find_by_username(&req.username)
        .await
        .map_err(AppError::from)?;

    // Fixed delay before checking the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let employee = match employee {
        Some(e) => {
            if !e.is_active {
                return Err(AppError::forbidden("Account has been disabled".to_string()));
            }

            let password_valid = e
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                tracing::warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            e
        }
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let user_id = employee
        .id
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_default();

    let token = state
        .get_jwt_service()
        .generate_token(
            &user_id,
            &employee.username,
            &employee.display_name,
            employee.is_admin,
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = %user_id,
        username = %employee.username,
        is_admin = employee.is_admin,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            id: user_id,
            username: employee.username.clone(),
            display_name: employee.display_name.clone(),
            email: employee.email.clone(),
            is_admin: employee.is_admin,
            has_completed_setup: employee.has_completed_setup,
        },
    }))
}

/// GET /api/auth/me — profile of the bearer
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UserInfo>> {
    let repo = EmployeeRepository::new(state.get_db());
    let employee = repo
        .find_by_id(&user.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Employee {} not found", user.id)))?;

    Ok(Json(UserInfo {
        id: user.id,
        username: employee.username,
        display_name: employee.display_name,
        email: employee.email,
        is_admin: employee.is_admin,
        has_completed_setup: employee.has_completed_setup,
    }))
}
