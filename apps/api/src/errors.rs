use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::validation::SchemaError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("File is too large: uploads are limited to {limit} bytes")]
    FileTooLarge { limit: u64 },

    #[error(transparent)]
    SchemaMismatch(#[from] SchemaError),

    #[error("An LLM access key is required for this step; set one for the session first")]
    MissingCredential,

    #[error("Remote call failed (status {status}): {body}")]
    RemoteCallFailed { status: u16, body: String },

    #[error("Could not interpret the model response: {0}")]
    ResponseParseFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A portfolio run is already in progress for this session")]
    RunInProgress,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Gate errors are raised before a run starts; re-running cannot change them.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            AppError::FileTooLarge { .. }
                | AppError::MissingCredential
                | AppError::RunInProgress
                | AppError::NotFound(_)
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::SchemaMismatch(_) => "SCHEMA_MISMATCH",
            AppError::MissingCredential => "MISSING_CREDENTIAL",
            AppError::RemoteCallFailed { .. } => "REMOTE_CALL_FAILED",
            AppError::ResponseParseFailed(_) => "RESPONSE_PARSE_FAILED",
            AppError::ExportFailed(_) => "EXPORT_FAILED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::RunInProgress => "RUN_IN_PROGRESS",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) => AppError::RemoteCallFailed {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                body: e.to_string(),
            },
            LlmError::Api { status, message } => AppError::RemoteCallFailed {
                status,
                body: message,
            },
            other => AppError::ResponseParseFailed(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            AppError::SchemaMismatch(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::MissingCredential => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::RemoteCallFailed { status, .. } => {
                tracing::error!("Remote call failed with status {status}");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::ResponseParseFailed(msg) => {
                tracing::error!("Unusable model response: {msg}");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::ExportFailed(msg) => {
                tracing::error!("Export error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RunInProgress => (StatusCode::CONFLICT, self.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let AppError::SchemaMismatch(schema_error) = &self {
            error["kind"] = json!(schema_error.kind());
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_file_too_large_maps_to_413() {
        let (status, json) = error_to_response(AppError::FileTooLarge { limit: 10 }).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["error"]["code"], "FILE_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_schema_mismatch_reports_kind() {
        let err = crate::ingest::validation::parse_resume("not json").unwrap_err();
        let (status, json) = error_to_response(AppError::from(err)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "SCHEMA_MISMATCH");
        assert_eq!(json["error"]["kind"], "not_json");
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_status_and_body_in_message() {
        let err = AppError::from(LlmError::Api {
            status: 403,
            message: "API key not valid".to_string(),
        });
        let (status, json) = error_to_response(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.contains("403"));
        assert!(message.contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, json) =
            error_to_response(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("secret detail"));
    }

    #[test]
    fn test_gate_errors_are_not_retryable() {
        assert!(!AppError::MissingCredential.is_retryable());
        assert!(!AppError::FileTooLarge { limit: 1 }.is_retryable());
        assert!(AppError::ResponseParseFailed("x".to_string()).is_retryable());
        assert!(AppError::RemoteCallFailed { status: 500, body: String::new() }.is_retryable());
    }
}
