use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::errors::CoordinationError;

/// Instruction returned to an agent once a halt has been observed
pub const HALT_DIRECTIVE: &str = "HALT: a global stop has been issued. Cease all activity \
     immediately and do not call any further operations.";

/// API error type with HTTP status code and message
///
/// A halt is carried as its own shape so agents cannot mistake it for an
/// ordinary, retryable failure.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub halted: bool,
    pub halt_reason: Option<String>,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            halted: false,
            halt_reason: None,
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 503 error the caller may retry
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Creates the 410 Gone halt directive
    pub fn halted(reason: Option<String>) -> Self {
        Self {
            status: StatusCode::GONE,
            message: HALT_DIRECTIVE.to_string(),
            halted: true,
            halt_reason: reason,
        }
    }

    pub fn is_halt(&self) -> bool {
        self.halted
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = if self.halted {
            json!({
                "halted": true,
                "reason": self.halt_reason,
                "directive": self.message,
            })
        } else {
            json!({
                "error": self.message,
                "retryable": self.status == StatusCode::SERVICE_UNAVAILABLE,
            })
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<CoordinationError> for ApiError {
    fn from(err: CoordinationError) -> Self {
        if err.is_retryable() {
            tracing::warn!(error = %err, "Coordination store busy");
            Self::unavailable(err.to_string())
        } else {
            tracing::error!(error = %err, "Coordination store failure");
            Self::internal_server_error(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_contention_maps_to_retryable_503() {
        let err = ApiError::from(CoordinationError::LockUnavailable {
            path: "state.json.lock".to_string(),
            waited_ms: 10_000,
        });

        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.is_halt());
    }

    #[test]
    fn halt_is_distinct_from_failures() {
        let err = ApiError::halted(Some("operator stop".to_string()));

        assert_eq!(err.status, StatusCode::GONE);
        assert!(err.is_halt());
        assert_eq!(err.message, HALT_DIRECTIVE);
    }

    #[tokio::test]
    async fn halt_without_reason_still_renders_directive() {
        let err = ApiError::halted(None);
        assert!(err.is_halt());
        assert_eq!(err.halt_reason, None);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::GONE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["halted"], true);
        assert!(body["reason"].is_null());
        assert_eq!(body["directive"], HALT_DIRECTIVE);
        assert!(body.get("error").is_none());
    }

    #[test]
    fn ordinary_errors_are_not_halts() {
        let err = ApiError::conflict("Task is not pending");

        assert!(!err.is_halt());
        assert_eq!(err.halt_reason, None);
    }
}
