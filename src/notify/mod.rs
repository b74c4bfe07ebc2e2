//! Notification fan-out for deployment outcomes.
//!
//! Every configured channel is attempted independently; a channel failure
//! is logged by the channel itself and never reaches the webhook caller.

pub mod email;
pub mod mattermost;
pub mod slack;

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::runner::RunStatus;
use crate::settings::SmtpConfig;

/// A deployment outcome carried to every channel in structured form.
/// Channels format their own presentation from these fields; nothing is
/// serialized to a single string and re-parsed downstream.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub project_name: String,
    pub status: RunStatus,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl NotificationMessage {
    pub fn new(project_name: &str, status: RunStatus, details: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            status,
            details: details.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn formatted_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Attachment color for chat channels, keyed on run status.
pub(crate) fn status_color(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Success => "#36a64f",
        RunStatus::Failed => "#ff0000",
        RunStatus::Ignored => "#808080",
    }
}

/// Status emoji for markdown channels, same policy as `status_color`.
pub(crate) fn status_icon(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Success => ":white_check_mark:",
        RunStatus::Failed => ":x:",
        RunStatus::Ignored => ":grey_question:",
    }
}

/// Holds the process-level channel configuration and the shared HTTP
/// client used by the webhook channels.
pub struct Notifier {
    smtp: Option<SmtpConfig>,
    slack_token: Option<String>,
    http: reqwest::Client,
}

impl Notifier {
    pub fn new(smtp: Option<SmtpConfig>, slack_token: Option<String>) -> Self {
        Self {
            smtp,
            slack_token,
            http: reqwest::Client::new(),
        }
    }

    /// Attempts delivery on every channel named in `targets`. Sends run
    /// concurrently and are all awaited; best-effort, not guaranteed.
    pub async fn dispatch(&self, message: &NotificationMessage, targets: &HashMap<String, String>) {
        tokio::join!(
            async {
                if let Some(to_email) = targets.get("email") {
                    email::send(self.smtp.as_ref(), to_email, message).await;
                }
            },
            async {
                if let Some(webhook_url) = targets.get("slack_webhook") {
                    slack::send(&self.http, self.slack_token.as_deref(), webhook_url, message)
                        .await;
                }
            },
            async {
                if let Some(webhook_url) = targets.get("mattermost_webhook") {
                    mattermost::send(&self.http, webhook_url, message).await;
                }
            },
        );
    }
}
