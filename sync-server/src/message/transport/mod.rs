//! Transport layer abstraction
//!
//! Pluggable transports under one trait:
//! ```text
//!         ┌────────────────────┐
//!         │   Transport Trait  │
//!         └────────┬───────────┘
//!                  │
//!          ┌───────┴───────┐
//!          ▼               ▼
//!    TcpTransport   MemoryTransport
//!    (network)      (same process)
//! ```

mod memory;
mod tcp;

pub use memory::MemoryTransport;
pub use tcp::TcpTransport;

use async_trait::async_trait;
use shared::message::BusMessage;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use crate::utils::AppError;

/// Transport trait
///
/// Every transport supports reading and writing one message at a time plus
/// connection teardown.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Read one message from the transport
    async fn read_message(&self) -> Result<BusMessage, AppError>;

    /// Write one message to the transport
    async fn write_message(&self, msg: &BusMessage) -> Result<(), AppError>;

    /// Close the connection
    async fn close(&self) -> Result<(), AppError>;

    /// Peer address, when the transport has one
    fn peer_addr(&self) -> Option<String> {
        None
    }
}

// ========== Wire helpers ==========
//
// Frame layout: event type (1 byte) | request id (16 bytes) |
// payload length (4 bytes LE) | payload

/// Read a BusMessage from an async stream
pub(crate) async fn read_from_stream<R: AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<BusMessage, AppError> {
    use shared::message::EventType;

    let mut type_buf = [0u8; 1];
    match reader.read_exact(&mut type_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(AppError::ClientDisconnected);
        }
        Err(e) => {
            return Err(AppError::internal(format!("Read type failed: {}", e)));
        }
    }

    let event_type = EventType::try_from(type_buf[0])
        .map_err(|_| AppError::invalid("Invalid event type"))?;

    let mut uuid_buf = [0u8; 16];
    reader
        .read_exact(&mut uuid_buf)
        .await
        .map_err(|e| AppError::internal(format!("Read UUID failed: {}", e)))?;
    let request_id = Uuid::from_bytes(uuid_buf);

    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| AppError::internal(format!("Read len failed: {}", e)))?;

    let len = u32::from_le_bytes(len_buf) as usize;

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| AppError::internal(format!("Read payload failed: {}", e)))?;

    Ok(BusMessage {
        request_id,
        event_type,
        source: None,
        target: None,
        payload,
    })
}

/// Write a BusMessage to an async stream
pub(crate) async fn write_to_stream<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    msg: &BusMessage,
) -> Result<(), AppError> {
    let mut frame = Vec::with_capacity(1 + 16 + 4 + msg.payload.len());
    frame.push(msg.event_type as u8);
    frame.extend_from_slice(msg.request_id.as_bytes());
    frame.extend_from_slice(&(msg.payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&msg.payload);

    writer
        .write_all(&frame)
        .await
        .map_err(|e| AppError::internal(format!("Write failed: {}", e)))?;
    writer
        .flush()
        .await
        .map_err(|e| AppError::internal(format!("Flush failed: {}", e)))?;
    Ok(())
}
