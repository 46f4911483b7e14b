//! Database Module
//!
//! Embedded SurrealDB storage. The server owns a single connection handle
//! that repositories clone cheaply.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "nxtprof";
const DATABASE: &str = "ops";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone, Debug)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::finish_init(db).await
    }

    /// In-memory database for tests
    pub async fn in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;

        Self::finish_init(db).await
    }

    async fn finish_init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database ready (ns={}, db={})", NAMESPACE, DATABASE);
        Ok(Self { db })
    }
}

/// Idempotent schema definition, run at every startup
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS employee SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS employee_username ON TABLE employee COLUMNS username UNIQUE;
        DEFINE INDEX IF NOT EXISTS employee_email ON TABLE employee COLUMNS email UNIQUE;

        DEFINE TABLE IF NOT EXISTS standup SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS learning_hour SCHEMALESS;

        DEFINE TABLE IF NOT EXISTS attendance SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS attendance_date ON TABLE attendance COLUMNS session_date;
        DEFINE TABLE IF NOT EXISTS learning_hour_attendance SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS lh_attendance_date ON TABLE learning_hour_attendance COLUMNS session_date;

        DEFINE TABLE IF NOT EXISTS feedback SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS feedback_employee ON TABLE feedback COLUMNS employee_id;

        DEFINE TABLE IF NOT EXISTS onboarding_status SCHEMALESS;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

    Ok(())
}
