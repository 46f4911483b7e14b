//! Session API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Session router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sessions", routes())
}

fn routes() -> Router<ServerState> {
    // Read routes: every authenticated user observes the same session,
    // role-shaped in the handler
    let read_routes = Router::new()
        .route("/{kind}/today", get(handler::today))
        .route("/{kind}/{date}", get(handler::get_by_date));

    // Lifecycle actions: admin only
    let manage_routes = Router::new()
        .route("/{kind}/schedule", post(handler::schedule))
        .route("/{kind}/{date}/start", post(handler::start))
        .route(
            "/{kind}/{date}/attendance",
            post(handler::mark_attendance).put(handler::edit_attendance),
        )
        .route("/{kind}/{date}/stop", post(handler::stop))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
