//! Server configuration

use std::path::PathBuf;

use crate::auth::JwtConfig;

/// Server configuration — every knob can be overridden via environment
/// variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/standup-sync | working directory (db, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | BUS_TCP_PORT | 8081 | message bus TCP port |
/// | TIMEZONE | UTC | business timezone (IANA name) |
/// | SHEET_WEBHOOK_URL | (unset) | attendance spreadsheet webhook |
/// | ENVIRONMENT | development | development / staging / production |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Message bus TCP port
    pub bus_tcp_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Business timezone for session dates and scheduling validation
    pub timezone: chrono_tz::Tz,
    /// Attendance spreadsheet webhook, best-effort sync target
    pub sheet_webhook_url: Option<String>,
    /// development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/standup-sync".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            bus_tcp_port: std::env::var("BUS_TCP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),
            jwt: JwtConfig::default(),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::UTC),
            sheet_webhook_url: std::env::var("SHEET_WEBHOOK_URL").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the paths and ports (test scenarios)
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16, bus_tcp_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.bus_tcp_port = bus_tcp_port;
        config
    }

    /// Directory holding the embedded database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Directory holding rolling log files
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the working directory structure if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
