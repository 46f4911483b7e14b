//! TCP bus server
//!
//! Accept loop for remote bus clients. Every connection performs a
//! version-checked handshake before it joins the broadcast fan-out.

use std::sync::Arc;

use shared::message::{
    BusMessage, EventType, HandshakePayload, PROTOCOL_VERSION, ResponsePayload,
};
use tokio::net::TcpListener;
use uuid::Uuid;

use super::bus::MessageBus;
use super::transport::{TcpTransport, Transport};
use crate::utils::AppError;

/// Start the TCP accept loop. Runs until the bus shutdown token fires.
pub async fn start_tcp_server(bus: MessageBus) -> Result<(), AppError> {
    let addr = bus.config.tcp_listen_addr.clone();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Message bus TCP server listening on {}", addr);

    let shutdown = bus.shutdown_token().clone();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Message bus TCP server stopping");
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(peer = %peer, "Bus client connecting");
                        let bus = bus.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(bus, stream).await {
                                tracing::debug!(error = %e, "Bus client session ended");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept bus client");
                    }
                }
            }
        }
    }
}

/// Handshake, then pump messages both ways until either side drops
async fn handle_connection(bus: MessageBus, stream: tokio::net::TcpStream) -> Result<(), AppError> {
    let transport = Arc::new(TcpTransport::from_stream(stream));

    // First frame must be a handshake with a compatible protocol version
    let first = transport.read_message().await?;
    if first.event_type != EventType::Handshake {
        return Err(AppError::invalid("Expected handshake"));
    }
    let handshake: HandshakePayload = first
        .parse_payload()
        .map_err(|e| AppError::invalid(format!("Malformed handshake: {e}")))?;

    if handshake.version != PROTOCOL_VERSION {
        let refusal = BusMessage::response(&ResponsePayload {
            success: false,
            message: format!(
                "Protocol version mismatch: server {} client {}",
                PROTOCOL_VERSION, handshake.version
            ),
            data: None,
        });
        let _ = transport.write_message(&refusal).await;
        return Err(AppError::invalid("Protocol version mismatch"));
    }

    let client_id = handshake
        .client_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let ack = BusMessage::response(&ResponsePayload {
        success: true,
        message: "connected".to_string(),
        data: None,
    });
    transport.write_message(&ack).await?;

    bus.register_client(client_id.clone(), transport.clone());
    tracing::info!(client_id = %client_id, "Bus client connected");

    let mut server_rx = bus.subscribe();
    let shutdown = bus.shutdown_token().clone();

    let result = loop {
        tokio::select! {
            _ = shutdown.cancelled() => break Ok(()),
            broadcast = server_rx.recv() => {
                match broadcast {
                    Ok(msg) => {
                        // Targeted messages only go to their addressee
                        if let Some(target) = &msg.target
                            && target != &client_id
                        {
                            continue;
                        }
                        if let Err(e) = transport.write_message(&msg).await {
                            break Err(e);
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(client_id = %client_id, skipped = n, "Bus client lagging");
                    }
                    Err(_) => break Ok(()),
                }
            }
            inbound = transport.read_message() => {
                match inbound {
                    Ok(mut msg) => {
                        msg.source = Some(client_id.clone());
                        let _ = bus.send_to_server(msg).await;
                    }
                    Err(AppError::ClientDisconnected) => break Ok(()),
                    Err(e) => break Err(e),
                }
            }
        }
    };

    bus.unregister_client(&client_id);
    let _ = transport.close().await;
    tracing::info!(client_id = %client_id, "Bus client disconnected");
    result
}
