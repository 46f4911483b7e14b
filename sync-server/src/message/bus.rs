//! Message bus core
//!
//! # Message flow
//!
//! ```text
//! Server ──▶ publish() ──▶ server_tx ──▶ connected clients
//! Client ──▶ send_to_server() ──▶ client_tx ──▶ server-side subscribers
//! ```
//!
//! The live session view across all open clients hangs off this bus: every
//! state transition is published as a Sync message and each connected client
//! replays it into its local view.

use std::sync::Arc;

use dashmap::DashMap;
use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::transport::{MemoryTransport, Transport};
use crate::utils::AppError;

/// Configuration for the transport layer
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tcp_listen_addr: String,
    /// Capacity of the broadcast channels (default: 1024)
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tcp_listen_addr: "0.0.0.0:8081".to_string(),
            channel_capacity: 1024,
        }
    }
}

/// A connected remote client
#[derive(Debug, Clone)]
pub struct ConnectedClient {
    pub id: String,
    pub addr: Option<String>,
}

/// Message bus — routes and fans out messages
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// Client-to-server channel
    client_tx: broadcast::Sender<BusMessage>,
    /// Server-to-clients broadcast channel
    server_tx: broadcast::Sender<BusMessage>,
    pub(crate) config: TransportConfig,
    shutdown_token: CancellationToken,
    /// Connected clients (client id -> transport)
    pub(crate) clients: Arc<DashMap<String, Arc<dyn Transport>>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::from_config(TransportConfig::default())
    }

    pub fn from_config(config: TransportConfig) -> Self {
        let capacity = config.channel_capacity;
        let (client_tx, _) = broadcast::channel(capacity);
        let (server_tx, _) = broadcast::channel(capacity);
        Self {
            client_tx,
            server_tx,
            config,
            shutdown_token: CancellationToken::new(),
            clients: Arc::new(DashMap::new()),
        }
    }

    /// Publish a message to all subscribers (server -> clients)
    pub async fn publish(&self, msg: BusMessage) -> Result<(), AppError> {
        // send() errors only when there are no receivers; an idle bus is fine
        let _ = self.server_tx.send(msg);
        Ok(())
    }

    /// Send a message to the server (client -> server)
    pub async fn send_to_server(&self, msg: BusMessage) -> Result<(), AppError> {
        self.client_tx
            .send(msg)
            .map_err(|e| AppError::internal(e.to_string()))?;
        Ok(())
    }

    /// Subscribe to client messages (server side)
    pub fn subscribe_to_clients(&self) -> broadcast::Receiver<BusMessage> {
        self.client_tx.subscribe()
    }

    /// Subscribe to the server broadcast (client side)
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// Receive-only in-process transport
    pub fn memory_transport(&self) -> MemoryTransport {
        MemoryTransport::new(&self.server_tx)
    }

    /// In-process transport that can also send to the server
    pub fn client_memory_transport(&self) -> MemoryTransport {
        MemoryTransport::with_client_sender(&self.server_tx, &self.client_tx)
    }

    /// Broadcast sender (advanced use)
    pub fn sender(&self) -> &broadcast::Sender<BusMessage> {
        &self.server_tx
    }

    /// Shutdown token for background tasks
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Register a remote client transport
    pub fn register_client(&self, id: String, transport: Arc<dyn Transport>) {
        self.clients.insert(id, transport);
    }

    /// Remove a remote client transport
    pub fn unregister_client(&self, id: &str) {
        self.clients.remove(id);
    }

    /// Currently connected remote clients
    pub fn get_connected_clients(&self) -> Vec<ConnectedClient> {
        self.clients
            .iter()
            .map(|entry| ConnectedClient {
                id: entry.key().clone(),
                addr: entry.value().peer_addr(),
            })
            .collect()
    }

    /// Graceful shutdown — cancels the TCP accept loop and per-client tasks
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{EventType, SyncPayload};

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = MessageBus::new();
        let mut rx = bus.subscribe();

        let payload = SyncPayload {
            resource: "standup".to_string(),
            version: 1,
            action: "updated".to_string(),
            id: "2024-03-01".to_string(),
            data: None,
        };
        bus.publish(BusMessage::sync(&payload)).await.unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.event_type, EventType::Sync);
        let parsed: SyncPayload = msg.parse_payload().unwrap();
        assert_eq!(parsed.resource, "standup");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = MessageBus::new();
        let payload = SyncPayload {
            resource: "employee".to_string(),
            version: 1,
            action: "created".to_string(),
            id: "employee:a".to_string(),
            data: None,
        };
        assert!(bus.publish(BusMessage::sync(&payload)).await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_transport_round_trip() {
        let bus = MessageBus::new();
        let transport = bus.client_memory_transport();
        let mut server_rx = bus.subscribe_to_clients();

        let msg = BusMessage::new(EventType::Notification, b"hello".to_vec());
        transport.write_message(&msg).await.unwrap();

        let received = server_rx.recv().await.unwrap();
        assert_eq!(received.payload, b"hello");
    }
}
