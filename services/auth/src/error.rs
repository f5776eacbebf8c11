//! Error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors returned by the authentication endpoints
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid or missing input
    #[error("{0}")]
    BadRequest(String),

    /// Bad credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Email already registered
    #[error("{0}")]
    Conflict(String),

    /// Too many failed logins for this account
    #[error("Too many failed login attempts, retry in {retry_after} seconds")]
    TooManyRequests { retry_after: u64 },

    /// Anything the client cannot fix
    #[error("Internal server error")]
    Internal,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let label = if status.is_server_error() {
            "error"
        } else {
            "fail"
        };

        let body = Json(json!({
            "status": label,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
