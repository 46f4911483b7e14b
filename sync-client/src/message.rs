//! Message bus client
//!
//! Live subscription to server-side resource changes, either over TCP (with
//! a version-checked handshake) or from an in-process broadcast channel.

use shared::message::{
    BusMessage, EventType, HandshakePayload, PROTOCOL_VERSION, ResponsePayload,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

use crate::{ClientError, ClientResult};

enum Link {
    Tcp {
        reader: Mutex<OwnedReadHalf>,
        writer: Mutex<OwnedWriteHalf>,
    },
    Channel(Mutex<broadcast::Receiver<BusMessage>>),
}

/// Bus client — one live subscription to the server broadcast
pub struct MessageClient {
    link: Link,
    pub client_id: String,
}

impl MessageClient {
    /// Connect over TCP and perform the protocol handshake
    pub async fn connect(addr: &str, client_name: Option<String>) -> ClientResult<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ClientError::Bus(format!("Connect failed: {e}")))?;
        let (reader, writer) = stream.into_split();
        let client = Self {
            link: Link::Tcp {
                reader: Mutex::new(reader),
                writer: Mutex::new(writer),
            },
            client_id: Uuid::new_v4().to_string(),
        };

        let handshake = BusMessage::handshake(&HandshakePayload {
            version: PROTOCOL_VERSION,
            client_name,
            client_id: Some(client.client_id.clone()),
        });
        client.send(&handshake).await?;

        // First frame back is the handshake response
        let reply = client.recv().await?;
        if reply.event_type != EventType::Response {
            return Err(ClientError::Bus("Expected handshake response".to_string()));
        }
        let response: ResponsePayload = reply
            .parse_payload()
            .map_err(|e| ClientError::Bus(format!("Malformed handshake response: {e}")))?;
        if !response.success {
            return Err(ClientError::Bus(response.message));
        }

        tracing::debug!(client_id = %client.client_id, "Bus connected");
        Ok(client)
    }

    /// Subscribe from an in-process broadcast channel (tests, embedded use)
    pub fn from_channel(rx: broadcast::Receiver<BusMessage>) -> Self {
        Self {
            link: Link::Channel(Mutex::new(rx)),
            client_id: Uuid::new_v4().to_string(),
        }
    }

    /// Receive the next bus message
    pub async fn recv(&self) -> ClientResult<BusMessage> {
        match &self.link {
            Link::Tcp { reader, .. } => {
                let mut reader = reader.lock().await;
                read_frame(&mut *reader).await
            }
            Link::Channel(rx) => {
                let mut rx = rx.lock().await;
                loop {
                    match rx.recv().await {
                        Ok(msg) => return Ok(msg),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "Bus subscription lagging");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(ClientError::Bus("Bus closed".to_string()));
                        }
                    }
                }
            }
        }
    }

    /// Send a message to the server (TCP links only)
    pub async fn send(&self, msg: &BusMessage) -> ClientResult<()> {
        match &self.link {
            Link::Tcp { writer, .. } => {
                let mut writer = writer.lock().await;
                write_frame(&mut *writer, msg).await
            }
            Link::Channel(_) => Err(ClientError::Bus(
                "Channel link is receive-only".to_string(),
            )),
        }
    }
}

// ========== Wire codec ==========
//
// Frame layout mirrors the server: event type (1 byte) |
// request id (16 bytes) | payload length (4 bytes LE) | payload

async fn read_frame<R: AsyncReadExt + Unpin>(reader: &mut R) -> ClientResult<BusMessage> {
    let mut type_buf = [0u8; 1];
    reader
        .read_exact(&mut type_buf)
        .await
        .map_err(|e| ClientError::Bus(format!("Read type failed: {e}")))?;
    let event_type = EventType::try_from(type_buf[0])
        .map_err(|_| ClientError::Bus("Invalid event type".to_string()))?;

    let mut uuid_buf = [0u8; 16];
    reader
        .read_exact(&mut uuid_buf)
        .await
        .map_err(|e| ClientError::Bus(format!("Read UUID failed: {e}")))?;

    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| ClientError::Bus(format!("Read len failed: {e}")))?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| ClientError::Bus(format!("Read payload failed: {e}")))?;

    Ok(BusMessage {
        request_id: Uuid::from_bytes(uuid_buf),
        event_type,
        source: None,
        target: None,
        payload,
    })
}

async fn write_frame<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    msg: &BusMessage,
) -> ClientResult<()> {
    let mut frame = Vec::with_capacity(1 + 16 + 4 + msg.payload.len());
    frame.push(msg.event_type as u8);
    frame.extend_from_slice(msg.request_id.as_bytes());
    frame.extend_from_slice(&(msg.payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&msg.payload);

    writer
        .write_all(&frame)
        .await
        .map_err(|e| ClientError::Bus(format!("Write failed: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| ClientError::Bus(format!("Flush failed: {e}")))?;
    Ok(())
}
