//! Employee API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post, routing::put};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Employee router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/employees", routes())
}

fn routes() -> Router<ServerState> {
    // Read routes: any authenticated user can see the roster
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // Self-service routes: ownership is checked in the handler
    let self_routes = Router::new()
        .route("/{id}", put(handler::update))
        .route("/setup-complete", post(handler::setup_complete));

    // Management routes: admin only
    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/all", get(handler::list_with_inactive))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(self_routes).merge(manage_routes)
}
