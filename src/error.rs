//! Error types for the server.
//!
//! [`ServerError`] covers everything that can stop the server from starting.
//! [`ApiError`] covers the few per-request failures owned by this crate;
//! collaborator handlers produce their own responses.

use crate::config::ConfigError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;


/// Boxed error returned by collaborator route group factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Method not supported on this path.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status and machine-readable code.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::MethodNotAllowed(_) => (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

/// Fatal startup errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid or unreadable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No route group was supplied for a collaborator.
    #[error("collaborator '{0}' was not provided")]
    MissingCollaborator(&'static str),

    /// A collaborator route group failed to construct.
    #[error("collaborator '{name}' failed to construct: {source}")]
    Collaborator {
        /// Collaborator name.
        name: &'static str,
        /// Construction failure.
        #[source]
        source: BoxError,
    },

    /// The route registration sequence violates an ordering invariant.
    #[error("route order violation: {0}")]
    RouteOrder(String),

    /// The startup hook refused to start the server.
    #[error("startup hook failed: {0}")]
    Startup(String),

    /// Socket or serve failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
