//! Standup-Sync Server — team operations backend
//!
//! # Architecture overview
//!
//! - **Sessions** (`sessions`): scheduled/active/ended lifecycle for daily
//!   standups and learning hours, with batched attendance writes
//! - **Database** (`db`): embedded SurrealDB document store
//! - **Auth** (`auth`): JWT with an admin claim + Argon2 password hashing
//! - **Message bus** (`message`): live resource sync over memory/TCP
//!   transports
//! - **HTTP API** (`api`): axum routes over all of the above
//!
//! # Module structure
//!
//! ```text
//! sync-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT auth, admin gating
//! ├── db/            # models + repositories
//! ├── sessions/      # session lifecycle manager
//! ├── message/       # message bus
//! ├── services/      # spreadsheet webhook sync
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging, time helpers
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod message;
pub mod services;
pub mod sessions;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use message::{BusMessage, EventType, MessageBus};
pub use sessions::SessionManager;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env and initialize logging
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
    Ok(())
}
