//! Message bus
//!
//! Real-time fan-out of resource changes to connected clients. The bus core
//! is a pair of broadcast channels; transports plug in underneath.

pub mod bus;
pub mod tcp_server;
pub mod transport;

pub use bus::{ConnectedClient, MessageBus, TransportConfig};
pub use transport::{MemoryTransport, TcpTransport, Transport};

// Re-export the shared wire types alongside the bus
pub use shared::message::{BusMessage, EventType, SyncPayload};
