//! Mattermost notification channel: markdown message posted to an
//! incoming webhook URL.

use reqwest::Client;
use serde_json::json;
use tracing::{error, info, warn};

use super::{NotificationMessage, status_icon};

pub async fn send(http: &Client, webhook_url: &str, message: &NotificationMessage) {
    if webhook_url.is_empty() {
        warn!("Mattermost webhook URL not provided, skipping Mattermost notification");
        return;
    }

    let payload = json!({ "text": format_text(message) });

    match http.post(webhook_url).json(&payload).send().await {
        Ok(response) if response.status().is_success() => info!("Mattermost notification sent"),
        Ok(response) => error!(
            "Failed to send Mattermost notification: status {}",
            response.status()
        ),
        Err(e) => error!("Failed to send Mattermost notification: {}", e),
    }
}

fn format_text(message: &NotificationMessage) -> String {
    format!(
        "### :bell: Webhook Notification: {}\n\n\
         **Status**: {} {}\n\
         **Time**: {}\n\n\
         #### Details:\n\
         ```\n\
         {}\n\
         ```\n\
         ---\n\
         *Webhook Deploy Service*",
        message.project_name,
        status_icon(message.status),
        message.status,
        message.formatted_timestamp(),
        message.details
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunStatus;

    #[test]
    fn text_carries_status_icon_and_details() {
        let message = NotificationMessage::new("demo", RunStatus::Success, "deployed rev abc123");
        let text = format_text(&message);
        assert!(text.contains("Webhook Notification: demo"));
        assert!(text.contains(":white_check_mark: Success"));
        assert!(text.contains("deployed rev abc123"));
    }

    #[test]
    fn failed_status_uses_negative_icon() {
        let message = NotificationMessage::new("demo", RunStatus::Failed, "exit 1");
        assert!(format_text(&message).contains(":x: Failed"));
    }

    #[test]
    fn multiline_details_stay_inside_the_fence() {
        let message =
            NotificationMessage::new("demo", RunStatus::Failed, "line one\nline two\nline three");
        let text = format_text(&message);
        let fence_open = text.find("```\n").unwrap();
        let fence_close = text.rfind("\n```").unwrap();
        let fenced = &text[fence_open..fence_close];
        assert!(fenced.contains("line two"));
    }

    #[tokio::test]
    async fn empty_url_skips_without_error() {
        let message = NotificationMessage::new("demo", RunStatus::Ignored, "");
        send(&Client::new(), "", &message).await;
    }
}
