//! Client error types

use thiserror::Error;

/// Errors surfaced by the gateway and the bus client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    Internal(String),

    /// The wire shape did not match the expected schema
    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Bus error: {0}")]
    Bus(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
