//! Live sync tests
//!
//! The session document is observed through the message bus; these tests
//! cover both the in-process channel link and the TCP transport with its
//! handshake.

use std::time::Duration;

use sync_client::{MessageClient, SessionWatcher};
use sync_server::db::models::EmployeeCreate;
use sync_server::db::repository::EmployeeRepository;
use sync_server::message::TransportConfig;
use sync_server::{Config, ServerState};
use shared::message::EventType;
use shared::types::{SessionKind, SessionStatus};

use chrono::Datelike;

fn tomorrow() -> String {
    let date = chrono::Utc::now().date_naive().succ_opt().unwrap();
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

async fn boot_state() -> ServerState {
    let config = Config::with_overrides("/tmp/standup-sync-test", 0, 0);
    let state = ServerState::initialize_in_memory(&config).await;

    let repo = EmployeeRepository::new(state.get_db());
    repo.create(EmployeeCreate {
        username: "asha".to_string(),
        password: "correct-horse-battery".to_string(),
        display_name: Some("Asha Rao".to_string()),
        email: "asha@example.com".to_string(),
        employee_code: "NXT-0002".to_string(),
    })
    .await
    .unwrap();

    state
}

#[tokio::test]
async fn test_session_transitions_reach_in_process_subscriber() {
    let state = boot_state().await;
    let client = MessageClient::from_channel(state.bus.subscribe());
    let (mut watcher, view_rx) = SessionWatcher::new(SessionKind::Standup);

    let date = tomorrow();
    state
        .sessions
        .schedule(SessionKind::Standup, &date, "23:59", "employee:admin")
        .await
        .unwrap();
    state.sessions.start(SessionKind::Standup, &date).await.unwrap();
    state.sessions.stop(SessionKind::Standup, &date).await.unwrap();

    // Drain the three lifecycle broadcasts into the watcher
    for _ in 0..3 {
        let msg = tokio::time::timeout(Duration::from_secs(2), client.recv())
            .await
            .expect("bus message timed out")
            .unwrap();
        watcher.apply(&msg);
    }

    let view = view_rx.borrow().clone().expect("view should be populated");
    assert_eq!(view.status, SessionStatus::Ended);
    assert_eq!(view.roster.len(), 1);
}

#[tokio::test]
async fn test_tcp_subscriber_handshake_and_sync() {
    // Grab an ephemeral port for the bus TCP server
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let bus = sync_server::message::MessageBus::from_config(TransportConfig {
        tcp_listen_addr: addr.to_string(),
        ..Default::default()
    });
    let server_bus = bus.clone();
    tokio::spawn(async move {
        sync_server::message::tcp_server::start_tcp_server(server_bus)
            .await
            .unwrap();
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = MessageClient::connect(&addr.to_string(), Some("test-client".to_string()))
        .await
        .expect("handshake should succeed");

    // A broadcast published after the handshake reaches the TCP client
    let payload = shared::message::SyncPayload {
        resource: "standup".to_string(),
        version: 1,
        action: "scheduled".to_string(),
        id: tomorrow(),
        data: None,
    };
    bus.publish(shared::message::BusMessage::sync(&payload))
        .await
        .unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(2), client.recv())
        .await
        .expect("bus message timed out")
        .unwrap();
    assert_eq!(msg.event_type, EventType::Sync);
    let received: shared::message::SyncPayload = msg.parse_payload().unwrap();
    assert_eq!(received.resource, "standup");
}
