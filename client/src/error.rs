//! Error handling for the intake client
//!
//! Maps transport and API failures to one error type with a stable code and
//! a short message fit for a toast notification.

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use shared::{AssembleError, FieldErrors, ScanError, SelectorError};

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    // Transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // API errors
    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rejected by API: {0}")]
    Rejected(String),

    #[error("Duplicate entry: {0}")]
    Conflict(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Intake errors
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectorError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Cannot assemble payload: {0}")]
    Assemble(#[from] AssembleError),

    #[error("Scanner device error: {0}")]
    Scanner(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error summary shown to the user
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl ClientError {
    /// Map a non-success response to an error
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(body),
            StatusCode::NOT_FOUND => ClientError::NotFound(body),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Rejected(body),
            StatusCode::CONFLICT => ClientError::Conflict(body),
            _ => ClientError::Api {
                status: status.as_u16(),
                message: body,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Http(_) => "NETWORK_ERROR",
            ClientError::InvalidResponse(_) => "INVALID_RESPONSE",
            ClientError::Unauthorized => "UNAUTHORIZED",
            ClientError::Forbidden(_) => "FORBIDDEN",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::Rejected(_) => "REJECTED",
            ClientError::Conflict(_) => "DUPLICATE_ENTRY",
            ClientError::Api { .. } => "API_ERROR",
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::Selection(_) => "SELECTION_ERROR",
            ClientError::Scan(_) => "SCAN_ERROR",
            ClientError::Assemble(_) => "ASSEMBLE_ERROR",
            ClientError::Scanner(_) => "SCANNER_ERROR",
            ClientError::Configuration(_) => "CONFIGURATION_ERROR",
            ClientError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// One-line message for a transient notification
    pub fn detail(&self) -> ErrorDetail {
        let message = match self {
            ClientError::Http(_) => "Could not reach the server. Check your connection.".to_string(),
            ClientError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            ClientError::Forbidden(_) => "You do not have permission to perform this action".to_string(),
            ClientError::Conflict(msg) => format!("Already in stock: {}", msg),
            ClientError::Validation(_) => "Please fix the highlighted fields".to_string(),
            other => other.to_string(),
        };
        ErrorDetail {
            code: self.code(),
            message,
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
