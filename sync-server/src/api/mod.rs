//! API routing module
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`auth`] - login and current user
//! - [`employees`] - employee directory and profiles
//! - [`admin`] - role promotion and employee deletion
//! - [`sessions`] - standup / learning hour lifecycle and attendance
//! - [`feedback`] - feedback entries and windowed summaries
//! - [`onboarding`] - onboarding status documents

pub mod admin;
pub mod auth;
pub mod employees;
pub mod feedback;
pub mod health;
pub mod onboarding;
pub mod sessions;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Assemble the full application router
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(employees::router())
        .merge(admin::router())
        .merge(sessions::router())
        .merge(feedback::router())
        .merge(onboarding::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
