//! Error types for web handlers.
//!
//! This module defines the bridge between domain errors and HTTP responses.
//! Handlers return `AppError`, which implements Axum's `IntoResponse` and
//! serializes to a small JSON body carrying a machine-readable error code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Wraps a status code, a stable machine-readable error code (the value
/// clients branch on, e.g. `registrations_full`) and a human-readable
/// message. Internal sources are kept for server-side logging only and are
/// never serialized to the client.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let row = find_registration(email).await
///         .map_err(|e| AppError::internal().with_source(e.into()))?;
///     Ok(Json(row))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code.
    status: StatusCode,
    /// Stable error code for client error handling.
    code: String,
    /// Human-readable message (user-facing).
    message: String,
    /// Internal error (for logging, not exposed to the client).
    source: Option<anyhow::Error>,
    /// Extra payload fields merged into the JSON body.
    extra: Option<serde_json::Value>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, code: String, message: String) -> Self {
        Self {
            status,
            code,
            message,
            source: None,
            extra: None,
        }
    }

    /// Attach an internal source error for server-side logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Merge extra fields into the serialized error body.
    ///
    /// `extra` must serialize to a JSON object; its fields are added next to
    /// `error` and `message` (used e.g. to attach the current registration
    /// status to a conflict response).
    #[must_use]
    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code.into(), message.into())
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized".to_string(),
            message.into(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code.into(), message.into())
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code.into(), message.into())
    }

    /// Create a 500 Internal Server Error with a generic message.
    ///
    /// The message is deliberately vague: storage and upstream failures are
    /// logged server-side and never leaked to the client.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error".to_string(),
            "An internal error occurred".to_string(),
        )
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code of this error.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Stable error code for client error handling.
    error: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Server-class failures are logged with their internal source;
        // client errors are the caller's problem and stay quiet.
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    error = %source,
                    "request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "request failed"
                ),
            }
        }

        let mut body = serde_json::json!(ErrorResponse {
            error: self.code,
            message: self.message,
        });

        if let (Some(obj), Some(serde_json::Value::Object(extra))) =
            (body.as_object_mut(), self.extra)
        {
            obj.extend(extra);
        }

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to a generic 500 `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal().with_source(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let err = AppError::bad_request("invalid_email", "Email is malformed");
        assert_eq!(err.to_string(), "[invalid_email] Email is malformed");
    }

    #[test]
    fn conflict_carries_status_and_code() {
        let err = AppError::conflict("registrations_full", "No slots left");
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "registrations_full");
    }

    #[test]
    fn internal_has_generic_message() {
        let err = AppError::internal().with_source(anyhow::anyhow!("pg connection refused"));
        // The upstream detail stays out of the display string.
        assert_eq!(err.to_string(), "[internal_error] An internal error occurred");
    }

    #[tokio::test]
    async fn extra_fields_merge_into_body() {
        let err = AppError::conflict("registration_exists", "Already registered")
            .with_extra(serde_json::json!({ "status": "PAID" }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "registration_exists");
        assert_eq!(body["status"], "PAID");
    }
}
