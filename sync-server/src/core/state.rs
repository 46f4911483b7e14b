//! Server state

use std::sync::Arc;

use dashmap::DashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::message::{MessageBus, TransportConfig};
use crate::services::SheetSyncService;
use crate::sessions::SessionManager;
use shared::message::{BusMessage, SyncPayload};

/// Resource version manager
///
/// Lock-free per-resource version counters backing `broadcast_sync`.
/// Clients compare the version against their last-seen value to decide
/// whether to refetch.
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// Increment the version for a resource and return the new value
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current version for a resource (0 if never incremented)
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// Server state — shared handles to every service
///
/// Cheap to clone; every field is either a shared handle or wrapped in Arc.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// Embedded database handle
    pub db: Surreal<Db>,
    /// Message bus for live client sync
    pub bus: MessageBus,
    pub jwt_service: Arc<JwtService>,
    pub resource_versions: Arc<ResourceVersions>,
    /// Session lifecycle manager (shares db, bus and versions)
    pub sessions: SessionManager,
}

impl ServerState {
    /// Initialize state against the on-disk database
    ///
    /// # Panics
    ///
    /// Panics when the working directory or database cannot be initialized;
    /// the process has nothing to serve without them.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("standup-sync.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self::from_db(config, db_service)
    }

    /// Initialize state over an in-memory database (tests)
    pub async fn initialize_in_memory(config: &Config) -> Self {
        let db_service = DbService::in_memory()
            .await
            .expect("Failed to initialize in-memory database");
        Self::from_db(config, db_service)
    }

    fn from_db(config: &Config, db_service: DbService) -> Self {
        let db = db_service.db;
        let bus = MessageBus::from_config(TransportConfig {
            tcp_listen_addr: format!("0.0.0.0:{}", config.bus_tcp_port),
            ..Default::default()
        });
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let resource_versions = Arc::new(ResourceVersions::new());
        let sheet_sync = SheetSyncService::new(config.sheet_webhook_url.clone());
        let sessions = SessionManager::new(
            db.clone(),
            bus.clone(),
            resource_versions.clone(),
            sheet_sync,
            config.timezone,
        );

        Self {
            config: config.clone(),
            db,
            bus,
            jwt_service,
            resource_versions,
            sessions,
        }
    }

    /// Start background tasks. Call before `Server::run()`.
    pub fn start_background_tasks(&self) {
        let bus = self.bus.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::message::tcp_server::start_tcp_server(bus).await {
                tracing::error!("Message bus TCP server failed: {}", e);
            }
        });
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Broadcast a resource change to all connected clients.
    ///
    /// The version number auto-increments per resource.
    pub async fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        let _ = self.bus.publish(BusMessage::sync(&payload)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_versions_increment() {
        let versions = ResourceVersions::new();
        assert_eq!(versions.get("standup"), 0);
        assert_eq!(versions.increment("standup"), 1);
        assert_eq!(versions.increment("standup"), 2);
        assert_eq!(versions.increment("employee"), 1);
        assert_eq!(versions.get("standup"), 2);
    }
}
