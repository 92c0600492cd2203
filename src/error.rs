use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

use crate::models::WebhookResponse;

#[derive(Debug)]
pub enum IntakeError {
    // I/O errors
    Io(std::io::Error),

    // Startup configuration errors
    Config(String),
    Credentials(String),

    // Request validation errors
    InvalidPayload(String),

    // Storage sink errors
    TokenExchange(String),
    SinkRequest(String),
    SinkRejected { status: u16, body: String },

    // Auth errors
    Unauthorized,
    InvalidApiKey,

    // Internal errors
    Signing(String),
    Unknown(String),
}

impl fmt::Display for IntakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntakeError::Io(e) => write!(f, "I/O error: {}", e),
            IntakeError::Config(msg) => write!(f, "Configuration error: {}", msg),
            IntakeError::Credentials(msg) => write!(f, "Credential error: {}", msg),
            IntakeError::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
            IntakeError::TokenExchange(msg) => write!(f, "Token exchange failed: {}", msg),
            IntakeError::SinkRequest(msg) => write!(f, "Storage request failed: {}", msg),
            IntakeError::SinkRejected { status, body } => {
                write!(f, "Storage rejected append (HTTP {}): {}", status, body)
            }
            IntakeError::Unauthorized => write!(f, "Unauthorized"),
            IntakeError::InvalidApiKey => write!(f, "Invalid API key"),
            IntakeError::Signing(msg) => write!(f, "JWT signing error: {}", msg),
            IntakeError::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for IntakeError {}

// Conversions
impl From<std::io::Error> for IntakeError {
    fn from(err: std::io::Error) -> Self {
        IntakeError::Io(err)
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        IntakeError::Unknown(err.to_string())
    }
}

impl From<reqwest::Error> for IntakeError {
    fn from(err: reqwest::Error) -> Self {
        IntakeError::SinkRequest(err.to_string())
    }
}

impl From<openssl::error::ErrorStack> for IntakeError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        IntakeError::Signing(err.to_string())
    }
}

// Axum integration
impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            IntakeError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            IntakeError::Unauthorized | IntakeError::InvalidApiKey => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            _ => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, axum::Json(WebhookResponse::error(message))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
