//! End-to-end API tests
//!
//! Boots the server over an in-memory database on an ephemeral port and
//! drives it through the typed client.

use chrono::Datelike;
use sync_client::{ClientConfig, ClientError, HttpClient};
use sync_server::db::repository::EmployeeRepository;
use sync_server::db::models::EmployeeCreate;
use sync_server::{Config, ServerState};
use shared::client::FeedbackSummaryQuery;
use shared::types::{AttendanceStatus, SessionKind, SessionStatus, TimeFrame};

async fn boot() -> (HttpClient, ServerState) {
    let config = Config::with_overrides("/tmp/standup-sync-test", 0, 0);
    let state = ServerState::initialize_in_memory(&config).await;

    let app = sync_server::api::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = HttpClient::new(&ClientConfig {
        base_url: format!("http://{addr}"),
        ..Default::default()
    });
    (client, state)
}

/// Seed one admin and one regular employee directly through the repository
async fn seed_users(state: &ServerState) {
    let repo = EmployeeRepository::new(state.get_db());
    let admin = repo
        .create(EmployeeCreate {
            username: "lead".to_string(),
            password: "correct-horse-battery".to_string(),
            display_name: Some("Team Lead".to_string()),
            email: "lead@example.com".to_string(),
            employee_code: "NXT-0001".to_string(),
        })
        .await
        .unwrap();
    repo.set_admin(&admin.id.unwrap().to_string()).await.unwrap();

    repo.create(EmployeeCreate {
        username: "asha".to_string(),
        password: "correct-horse-battery".to_string(),
        display_name: Some("Asha Rao".to_string()),
        email: "asha@example.com".to_string(),
        employee_code: "NXT-0002".to_string(),
    })
    .await
    .unwrap();
}

fn tomorrow() -> String {
    let date = chrono::Utc::now().date_naive().succ_opt().unwrap();
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

#[tokio::test]
async fn test_login_and_role_claims() {
    let (client, state) = boot().await;
    seed_users(&state).await;

    // Wrong password gets the unified error
    let err = client.login("lead", "wrong").await;
    assert!(matches!(err, Err(ClientError::Validation(_))));

    let admin_login = client.login("lead", "correct-horse-battery").await.unwrap();
    assert!(admin_login.user.is_admin);

    let user_login = client.login("asha", "correct-horse-battery").await.unwrap();
    assert!(!user_login.user.is_admin);

    // Unauthenticated requests are rejected
    let err = client.employees().await;
    assert!(matches!(err, Err(ClientError::Unauthorized)));

    let authed = client.with_token(user_login.token);
    let employees = authed.employees().await.unwrap();
    assert_eq!(employees.len(), 2);
}

#[tokio::test]
async fn test_session_lifecycle_over_http() {
    let (client, state) = boot().await;
    seed_users(&state).await;

    let admin = client.login("lead", "correct-horse-battery").await.unwrap();
    let employee = client.login("asha", "correct-horse-battery").await.unwrap();
    let employee_id = employee.user.id.clone();
    let admin_client = client.clone().with_token(admin.token);
    let employee_client = client.with_token(employee.token);

    let date = tomorrow();

    // Scheduling in the past is rejected regardless of admin identity
    let err = admin_client
        .schedule_session(SessionKind::Standup, "2020-01-01", "09:00")
        .await;
    assert!(matches!(err, Err(ClientError::Validation(_))));

    // Non-admins cannot schedule at all
    let err = employee_client
        .schedule_session(SessionKind::Standup, &date, "09:00")
        .await;
    assert!(matches!(err, Err(ClientError::Forbidden(_))));

    let scheduled = admin_client
        .schedule_session(SessionKind::Standup, &date, "23:59")
        .await
        .unwrap();
    assert_eq!(scheduled.status, SessionStatus::Scheduled);

    let started = admin_client
        .start_session(SessionKind::Standup, &date)
        .await
        .unwrap();
    assert_eq!(started.status, SessionStatus::Active);

    // NotAvailable without a reason is rejected; with one it is accepted
    let err = admin_client
        .mark_attendance(
            SessionKind::Standup,
            &date,
            &employee_id,
            AttendanceStatus::NotAvailable,
            None,
        )
        .await;
    assert!(matches!(err, Err(ClientError::Validation(_))));

    admin_client
        .mark_attendance(
            SessionKind::Standup,
            &date,
            &employee_id,
            AttendanceStatus::Present,
            None,
        )
        .await
        .unwrap();

    // While active, non-admins see the session without a roster
    let observed = employee_client
        .session(SessionKind::Standup, &date)
        .await
        .unwrap();
    assert_eq!(observed.status, SessionStatus::Active);
    assert!(observed.roster.is_empty());

    let ended = admin_client
        .stop_session(SessionKind::Standup, &date)
        .await
        .unwrap();
    assert_eq!(ended.status, SessionStatus::Ended);
    // Both seeded employees have a record; the untouched one is Missed
    assert_eq!(ended.roster.len(), 2);
    let missed = ended
        .roster
        .iter()
        .filter(|r| r.status == AttendanceStatus::Missed)
        .count();
    assert_eq!(missed, 1);

    // After the stop everyone sees the full read-only roster
    let observed = employee_client
        .session(SessionKind::Standup, &date)
        .await
        .unwrap();
    assert_eq!(observed.roster.len(), 2);

    // A second stop is rejected: no status regression
    let err = admin_client.stop_session(SessionKind::Standup, &date).await;
    assert!(matches!(err, Err(ClientError::Validation(_))));
}

#[tokio::test]
async fn test_admin_console_promote_and_delete() {
    let (client, state) = boot().await;
    seed_users(&state).await;

    let admin = client.login("lead", "correct-horse-battery").await.unwrap();
    let admin_client = client.clone().with_token(admin.token);

    let promoted = admin_client.promote("asha@example.com").await.unwrap();
    assert!(promoted.is_admin);

    let err = admin_client.promote("nobody@example.com").await;
    assert!(matches!(err, Err(ClientError::NotFound(_))));

    assert!(admin_client.delete_employee(&promoted.id).await.unwrap());
    let err = admin_client.promote("asha@example.com").await;
    assert!(matches!(err, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn test_feedback_summary_shapes() {
    let (client, state) = boot().await;
    seed_users(&state).await;

    let admin = client.login("lead", "correct-horse-battery").await.unwrap();
    let authed = client.with_token(admin.token);

    let employee_id = "employee:asha".to_string();

    // Empty window: explicit no-data, no graph field of either shape
    let empty = authed
        .feedback_summary(&FeedbackSummaryQuery {
            employee_id: employee_id.clone(),
            time_frame: TimeFrame::Daily,
            date: Some("2024-03-01".to_string()),
            start_date: None,
            end_date: None,
        })
        .await
        .unwrap();
    assert_eq!(empty.total, 0);
    assert!(empty.graph_data.is_none());
    assert!(empty.graph_timeseries.is_none());

    for (date, understanding, suggestion) in [
        ("2024-03-01", 4.0, None),
        ("2024-03-01", 5.0, None),
        ("2024-03-02", 2.0, Some("shorter demos".to_string())),
    ] {
        authed
            .submit_feedback(&shared::client::FeedbackSubmit {
                employee_id: employee_id.clone(),
                session_date: date.to_string(),
                understanding,
                instructor: 4.0,
                comment: "walkthrough notes".to_string(),
                tags: vec!["pace".to_string()],
                suggestion,
            })
            .await
            .unwrap();
    }

    // Single-point window: graph_data only
    let daily = authed
        .feedback_summary(&FeedbackSummaryQuery {
            employee_id: employee_id.clone(),
            time_frame: TimeFrame::Daily,
            date: Some("2024-03-01".to_string()),
            start_date: None,
            end_date: None,
        })
        .await
        .unwrap();
    assert_eq!(daily.total, 2);
    let graph = daily.graph_data.expect("single-point window needs graph_data");
    assert!((graph.avg_understanding - 4.5).abs() < 1e-9);
    assert!(daily.graph_timeseries.is_none());

    // Multi-point window: graph_timeseries only
    let range = authed
        .feedback_summary(&FeedbackSummaryQuery {
            employee_id: employee_id.clone(),
            time_frame: TimeFrame::Range,
            date: None,
            start_date: Some("2024-03-01".to_string()),
            end_date: Some("2024-03-10".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(range.total, 3);
    assert!(range.graph_data.is_none());
    let series = range.graph_timeseries.expect("range window needs a series");
    assert_eq!(series.len(), 2);
    assert_eq!(range.improvement_areas.len(), 1);
    assert_eq!(range.positive_feedback.len(), 2);

    // Degenerate range is rejected server-side too
    let err = authed
        .feedback_summary(&FeedbackSummaryQuery {
            employee_id,
            time_frame: TimeFrame::Range,
            date: None,
            start_date: Some("2024-03-01".to_string()),
            end_date: Some("2024-03-01".to_string()),
        })
        .await;
    assert!(matches!(err, Err(ClientError::Validation(_))));
}

#[tokio::test]
async fn test_onboarding_flow_over_http() {
    let (client, state) = boot().await;
    seed_users(&state).await;

    let user = client.login("asha", "correct-horse-battery").await.unwrap();
    let user_id = user.user.id.clone();
    let authed = client.with_token(user.token);

    // First visit creates InProgress
    let status = authed.onboarding(&user_id).await.unwrap();
    assert_eq!(status.status, shared::types::OnboardingState::InProgress);

    let done = authed
        .update_onboarding(
            &user_id,
            Some(shared::types::OnboardingState::Completed),
            Some(true),
            Some(75.0),
        )
        .await
        .unwrap();
    assert_eq!(done.status, shared::types::OnboardingState::Completed);
    assert!(done.completed_at.is_some());

    // Another employee's document is off-limits
    let err = authed.onboarding("employee:someone-else").await;
    assert!(matches!(err, Err(ClientError::Forbidden(_))));
}
