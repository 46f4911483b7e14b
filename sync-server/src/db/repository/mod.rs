//! Repository Module
//!
//! CRUD operations over the SurrealDB tables. Repositories take the shared
//! database handle and hide SurrealQL from the API layer.

pub mod attendance;
pub mod employee;
pub mod feedback;
pub mod onboarding;
pub mod session;

// Re-exports
pub use attendance::AttendanceRepository;
pub use employee::EmployeeRepository;
pub use feedback::FeedbackRepository;
pub use onboarding::OnboardingRepository;
pub use session::SessionRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A guarded transition found the document in the wrong state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        use crate::utils::AppError;
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::InvalidState(msg) => AppError::business_rule(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: "table:id" throughout the stack
// =============================================================================
//
// surrealdb::RecordId handles all ids:
//   - parse: let id: RecordId = "employee:abc".parse()?;
//   - build: let id = RecordId::from_table_key("standup", "2024-03-01");
//   - CRUD: db.select(id) / db.delete(id) take RecordId directly

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
