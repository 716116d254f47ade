use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to API consumers as `{"error": "..."}` bodies
#[derive(Debug, Error)]
pub enum ApiError {
    /// The gateway is running without cluster credentials
    #[error("Kubernetes client not initialized. Check your kubeconfig.")]
    ClientUnavailable,

    /// The request itself was malformed
    #[error("{0}")]
    BadRequest(String),

    /// The cluster rejected or failed the underlying request
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ClientUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn message(&self) -> String {
        match self {
            // Alternate formatting includes the cause chain
            Self::Upstream(e) => format!("{e:#}"),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(%status, "{message}");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::ClientUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::BadRequest("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Upstream(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_message_includes_cause_chain() {
        let err = ApiError::Upstream(
            anyhow::anyhow!("connection refused").context("Failed to list pods"),
        );
        let message = err.message();
        assert!(message.contains("Failed to list pods"));
        assert!(message.contains("connection refused"));
    }
}
