//! Common error types for the image generation studio

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Cannot delete '{0}': at least one profile must remain")]
    LastProfile(String),

    #[error("Profile '{0}' has not been validated")]
    ProfileNotValidated(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("History entry not found: {0}")]
    EntryNotFound(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("All {attempts} attempts failed: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether a retry has a reasonable chance of succeeding.
    ///
    /// Server-side (5xx) failures and timeouts are transient; everything else,
    /// including 4xx responses and rejected credentials, is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Api { status, message } => {
                *status >= 500 || message.to_lowercase().contains("timeout")
            }
            AppError::Timeout(_) => true,
            AppError::HttpClient(e) => {
                e.is_timeout()
                    || e.status().map(|s| s.is_server_error()).unwrap_or(false)
                    || e.to_string().to_lowercase().contains("timeout")
            }
            AppError::AuthenticationFailed(_)
            | AppError::InvalidRequest(_)
            | AppError::RetriesExhausted { .. } => false,
            other => other.to_string().to_lowercase().contains("timeout"),
        }
    }
}

/// Error response format (OpenAI compatible)
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::Json(_) => (StatusCode::BAD_REQUEST, "invalid_request_error", Some("invalid_json")),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, "provider_error", None),
            AppError::Api { .. } => (StatusCode::BAD_GATEWAY, "provider_error", Some("provider_rejected")),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout_error", None),
            AppError::AuthenticationFailed(_) => (StatusCode::UNAUTHORIZED, "authentication_error", Some("invalid_api_key")),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error", None),
            AppError::ProfileNotFound(_) => (StatusCode::NOT_FOUND, "not_found_error", Some("profile_not_found")),
            AppError::LastProfile(_) => (StatusCode::CONFLICT, "invalid_request_error", Some("last_profile")),
            AppError::ProfileNotValidated(_) => (StatusCode::PRECONDITION_FAILED, "invalid_request_error", Some("profile_not_validated")),
            AppError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "not_found_error", Some("session_not_found")),
            AppError::ImageNotFound(_) => (StatusCode::NOT_FOUND, "not_found_error", Some("image_not_found")),
            AppError::EntryNotFound(_) => (StatusCode::NOT_FOUND, "not_found_error", Some("entry_not_found")),
            AppError::Decode(_) => (StatusCode::UNPROCESSABLE_ENTITY, "decode_error", None),
            AppError::RetriesExhausted { .. } => (StatusCode::BAD_GATEWAY, "provider_error", Some("retries_exhausted")),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                message: self.to_string(),
                r#type: error_type.to_string(),
                code: code.map(|c| c.to_string()),
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
