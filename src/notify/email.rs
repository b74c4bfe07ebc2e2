//! Email notification channel over authenticated SMTP with STARTTLS.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info, warn};

use super::NotificationMessage;
use crate::settings::SmtpConfig;

/// Sends the notification as a plain-text email. Skipped with a warning
/// when the SMTP configuration is incomplete; send errors are logged and
/// never raised to the caller.
pub async fn send(smtp: Option<&SmtpConfig>, to_email: &str, message: &NotificationMessage) {
    let Some(smtp) = smtp else {
        warn!("Email configuration incomplete, skipping email notification");
        return;
    };

    let from: Mailbox = match smtp.from_email.parse() {
        Ok(mailbox) => mailbox,
        Err(e) => {
            error!("Invalid from address '{}': {}", smtp.from_email, e);
            return;
        }
    };
    let to: Mailbox = match to_email.parse() {
        Ok(mailbox) => mailbox,
        Err(e) => {
            error!("Invalid recipient address '{}': {}", to_email, e);
            return;
        }
    };

    let email = match Message::builder()
        .from(from)
        .to(to)
        .subject(format!("Webhook Update: {}", message.project_name))
        .header(ContentType::TEXT_PLAIN)
        .body(body_text(message))
    {
        Ok(email) => email,
        Err(e) => {
            error!("Failed to build email: {}", e);
            return;
        }
    };

    let mailer = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.server) {
        Ok(builder) => builder
            .port(smtp.port)
            .credentials(Credentials::new(smtp.user.clone(), smtp.password.clone()))
            .build(),
        Err(e) => {
            error!("Failed to configure SMTP transport: {}", e);
            return;
        }
    };

    match mailer.send(email).await {
        Ok(_) => info!("Email sent to {}", to_email),
        Err(e) => error!("Failed to send email: {}", e),
    }
}

fn body_text(message: &NotificationMessage) -> String {
    format!(
        "Webhook for {} - Status: {}\nTime: {}\n\nDetails:\n{}",
        message.project_name,
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
    fn body_contains_structured_fields() {
        let message = NotificationMessage::new("demo", RunStatus::Failed, "line one\nline two");
        let body = body_text(&message);
        assert!(body.contains("Webhook for demo"));
        assert!(body.contains("Status: Failed"));
        assert!(body.contains("line one\nline two"));
    }

    #[tokio::test]
    async fn missing_config_skips_without_error() {
        let message = NotificationMessage::new("demo", RunStatus::Success, "done");
        send(None, "ops@example.com", &message).await;
    }

    #[tokio::test]
    async fn invalid_recipient_is_swallowed() {
        let smtp = SmtpConfig {
            server: "smtp.example.com".to_string(),
            port: 587,
            user: "deployer".to_string(),
            password: "hunter2".to_string(),
            from_email: "deploy@example.com".to_string(),
        };
        let message = NotificationMessage::new("demo", RunStatus::Success, "done");
        send(Some(&smtp), "not an address", &message).await;
    }
}
