//! The webhook processing pipeline: authenticate, filter by branch,
//! execute the project's commands, notify, respond.

use axum::body::Bytes;
use axum::http::HeaderMap;
use serde::Serialize;
use std::path::Path;
use tracing::{error, info};

use crate::error::DeployError;
use crate::notify::NotificationMessage;
use crate::runner::{RunStatus, run_commands};
use crate::signature::{SIGNATURE_HEADER, validate_signature};
use crate::SharedState;

/// Body returned for requests that reach a terminal pipeline state.
/// Authentication and lookup failures surface as plain error responses
/// without this structure.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub message: String,
    pub status: RunStatus,
    pub details: String,
}

/// Processes one webhook delivery end to end.
///
/// Pipeline: registry lookup -> config validation -> signature check ->
/// branch filter -> command execution -> notification fan-out. Lookup,
/// config, and signature failures short-circuit before any side effect;
/// branch-filtered, successful, and failed runs all notify.
pub async fn process_webhook(
    state: &SharedState,
    project_name: &str,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<WebhookResponse, DeployError> {
    let project = state
        .registry
        .get(project_name)
        .ok_or(DeployError::ProjectNotFound)?;
    project.validate()?;

    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    validate_signature(&project.secret_token, body, signature)?;

    info!("Received webhook for project {}", project.name);

    // The raw bytes were needed for the signature; only now parse them.
    // A body that is not JSON is a failed run, reported like one. Only a
    // missing or non-matching ref in valid JSON is filtered out.
    let payload: serde_json::Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            let details = format!("Could not parse webhook payload: {}", e);
            error!(
                "Error processing webhook for {}: {}",
                project.name, details
            );
            let message = NotificationMessage::new(&project.name, RunStatus::Failed, &details);
            state.notifier.dispatch(&message, &project.notifications).await;
            return Err(DeployError::ExecutionFailed { details });
        }
    };
    let push_ref = payload.get("ref").and_then(|r| r.as_str());

    if push_ref != Some(project.target_branch.as_str()) {
        let details = format!(
            "Push was not to the target branch {}.",
            project.target_branch
        );
        info!(
            "Ignoring push to {:?} for project {}",
            push_ref, project.name
        );
        let message = NotificationMessage::new(&project.name, RunStatus::Ignored, &details);
        state.notifier.dispatch(&message, &project.notifications).await;
        return Ok(WebhookResponse {
            message: "Push was not to the target branch, ignoring.".to_string(),
            status: RunStatus::Ignored,
            details,
        });
    }

    // Deployments are serialized per project; a concurrent push for the
    // same project waits here instead of racing in the working tree.
    let lock = state.deploy_lock(&project.name);
    let _guard = match lock {
        Some(lock) => Some(lock.lock().await),
        None => None,
    };

    let result = run_commands(&project.commands, Path::new(&project.directory)).await;

    let message = NotificationMessage::new(&project.name, result.status, &result.details);
    state.notifier.dispatch(&message, &project.notifications).await;

    match result.status {
        RunStatus::Failed => {
            error!(
                "Error processing webhook for {}: {}",
                project.name, result.details
            );
            Err(DeployError::ExecutionFailed {
                details: result.details,
            })
        }
        _ => Ok(WebhookResponse {
            message: format!("Webhook received and processed for {}", project.name),
            status: result.status,
            details: result.details,
        }),
    }
}
