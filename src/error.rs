use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Custom error type for webhook-deploy operations
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Signature header missing")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Project not found")]
    ProjectNotFound,

    #[error("Invalid project configuration: {0}")]
    InvalidConfig(String),

    #[error("{details}")]
    ExecutionFailed { details: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DeployError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeployError::MissingSignature | DeployError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            DeployError::ProjectNotFound => StatusCode::NOT_FOUND,
            DeployError::InvalidConfig(_)
            | DeployError::ExecutionFailed { .. }
            | DeployError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DeployError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(json!({ "detail": self.to_string() })),
        )
            .into_response()
    }
}

/// Helper type for Results that use DeployError
pub type Result<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_unauthorized() {
        assert_eq!(
            DeployError::MissingSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DeployError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn lookup_and_execution_errors_map_to_http_statuses() {
        assert_eq!(
            DeployError::ProjectNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DeployError::InvalidConfig("bad".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DeployError::ExecutionFailed {
                details: "boom".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn execution_failure_displays_raw_details() {
        let err = DeployError::ExecutionFailed {
            details: "Command git pull failed".into(),
        };
        assert_eq!(err.to_string(), "Command git pull failed");
    }
}
