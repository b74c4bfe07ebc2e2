//! Slack notification channel: rich attachment payload posted to an
//! incoming webhook, authenticated with the process-level bot token.

use reqwest::Client;
use serde_json::json;
use tracing::{error, info, warn};

use super::{NotificationMessage, status_color};

pub async fn send(
    http: &Client,
    token: Option<&str>,
    webhook_url: &str,
    message: &NotificationMessage,
) {
    let Some(token) = token else {
        warn!("Slack configuration incomplete, skipping Slack notification");
        return;
    };
    if webhook_url.is_empty() {
        warn!("Slack webhook URL not provided, skipping Slack notification");
        return;
    }

    let payload = build_payload(message);

    match http
        .post(webhook_url)
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => info!("Slack notification sent"),
        Ok(response) => error!(
            "Failed to send Slack notification: status {}",
            response.status()
        ),
        Err(e) => error!("Failed to send Slack notification: {}", e),
    }
}

fn build_payload(message: &NotificationMessage) -> serde_json::Value {
    let details = if message.details.is_empty() {
        "No details available".to_string()
    } else {
        format!("```{}```", message.details)
    };

    json!({
        "attachments": [{
            "color": status_color(message.status),
            "title": format!("Webhook Notification: {}", message.project_name),
            "fields": [
                {
                    "title": "Status",
                    "value": message.status.to_string(),
                    "short": true
                },
                {
                    "title": "Timestamp",
                    "value": message.formatted_timestamp(),
                    "short": true
                },
                {
                    "title": "Details",
                    "value": details,
                    "short": false
                }
            ],
            "footer": "Webhook Deploy Service",
        }]
    })
}
