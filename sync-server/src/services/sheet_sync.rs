//! Spreadsheet sync service
//!
//! Best-effort mirror of final standup attendance into an external
//! spreadsheet webhook. The POST is fire-and-forget: the response is never
//! awaited by callers and failures only produce a log line.

use serde::Serialize;
use shared::client::RosterEntry;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SheetRow<'a> {
    date: &'a str,
    employee_id: &'a str,
    employee_name: &'a str,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

/// Webhook client for the attendance spreadsheet
#[derive(Debug, Clone)]
pub struct SheetSyncService {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl SheetSyncService {
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            webhook_url,
        }
    }

    /// Service that never posts (tests, webhook not configured)
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Post the final roster for one session day. Returns immediately;
    /// the request runs on a spawned task.
    pub fn sync_roster(&self, date: &str, roster: &[RosterEntry]) {
        let Some(url) = self.webhook_url.clone() else {
            tracing::debug!("Sheet sync webhook not configured, skipping");
            return;
        };

        let rows: Vec<serde_json::Value> = roster
            .iter()
            .filter_map(|entry| {
                serde_json::to_value(SheetRow {
                    date,
                    employee_id: &entry.employee_id,
                    employee_name: &entry.employee_name,
                    status: entry.status.to_string(),
                    reason: entry.reason.as_deref(),
                })
                .ok()
            })
            .collect();

        let client = self.client.clone();
        let date = date.to_string();
        tokio::spawn(async move {
            match client.post(&url).json(&rows).send().await {
                Ok(resp) => {
                    tracing::debug!(date = %date, status = %resp.status(), "Sheet sync posted");
                }
                Err(e) => {
                    tracing::warn!(date = %date, error = %e, "Sheet sync failed");
                }
            }
        });
    }
}
