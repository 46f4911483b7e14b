//! Utility module — common helpers and types
//!
//! - [`AppError`] / [`AppResult`] - application error types
//! - [`logger`] - tracing setup
//! - [`time`] - business timezone helpers

pub mod error;
pub mod logger;
pub mod result;
pub mod time;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
