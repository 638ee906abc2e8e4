//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Credentials rejected.
    #[error("Access Denied")]
    AccessDenied,

    /// The session is not logged in.
    #[error("Login required")]
    LoginRequired { session_id: String },

    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Session store error.
    #[error("Session error: {0}")]
    Session(#[from] webca_session::Error),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Session that has to log in, for `login_required`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use webca_session::Error as SessionError;

        match self {
            ServerError::AccessDenied => (StatusCode::UNAUTHORIZED, "access_denied"),
            ServerError::LoginRequired { .. } => (StatusCode::UNAUTHORIZED, "login_required"),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ServerError::Session(SessionError::Cookie(_)) => {
                (StatusCode::BAD_REQUEST, "malformed_cookie")
            }
            ServerError::Session(SessionError::ReservedKey(_)) => {
                (StatusCode::BAD_REQUEST, "reserved_key")
            }
            ServerError::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "session_error"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), code, error = %message, "Request failed");
        } else {
            tracing::debug!(status = %status.as_u16(), code, error = %message, "Request rejected");
        }

        let session_id = match self {
            ServerError::LoginRequired { session_id } => Some(session_id),
            _ => None,
        };

        let body = ErrorResponse {
            code: code.to_string(),
            message,
            session_id,
        };

        (status, Json(body)).into_response()
    }
}
