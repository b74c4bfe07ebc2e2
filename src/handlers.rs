use axum::{
    Json,
    body::Bytes,
    extract::Path,
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use tracing::warn;
use webhook_deploy::SharedState;
use webhook_deploy::error::DeployError;
use webhook_deploy::processor::{WebhookResponse, process_webhook};

/// Health check endpoint for monitoring: 200 when the project registry
/// file is present and parses as JSON, 503 otherwise.
pub async fn health(AxumState(state): AxumState<SharedState>) -> impl IntoResponse {
    let probe = match tokio::fs::read_to_string(&state.config_path).await {
        Ok(content) => serde_json::from_str::<serde_json::Value>(&content)
            .map(|_| ())
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match probe {
        Ok(()) => Json(json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339(),
            "config_file": state.config_path,
        }))
        .into_response(),
        Err(reason) => {
            warn!("Health check failed: {}", reason);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": format!("Service unhealthy: {}", reason) })),
            )
                .into_response()
        }
    }
}

/// Handles the webhook POST for one project. The body arrives as raw
/// bytes so the signature is verified over the exact transmitted form.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    Path(project_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, DeployError> {
    let response = process_webhook(&state, &project_name, &headers, &body).await?;
    Ok(Json(response))
}
