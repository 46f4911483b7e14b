//! Admin Console API Module

mod handler;

use axum::{Router, middleware, routing::delete, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Admin router — everything behind the admin claim
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/promote", post(handler::promote))
        .route("/employees/{id}", delete(handler::delete_employee))
        .layer(middleware::from_fn(require_admin))
}
