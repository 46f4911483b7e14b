//! Onboarding API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Onboarding router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/onboarding", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/{employee_id}", get(handler::get).put(handler::update))
}
