//! Centralized error handling for the loan client
//!
//! `ApiError` is the typed failure of a single request against the
//! loan-servicing API. The store collapses every failure into a
//! `StateError` that is carried on the state record for views to display.

use serde::Serialize;
use thiserror::Error;

use crate::payment::PaymentValidationError;

/// API error type with a stable error code per variant
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Server { .. } => "SERVER_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Rejected(_) => "REJECTED",
            ApiError::Decode(_) => "DECODE_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// The message without the variant prefix.
    ///
    /// For server-reported failures this is the text the server sent.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Network(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Rejected(m)
            | ApiError::Decode(m)
            | ApiError::ValidationError(m) => m,
            ApiError::Server { message, .. } => message,
        }
    }

    /// Build an error from a non-success HTTP status and the server's message
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            400 | 409 | 422 => ApiError::Rejected(message),
            _ => ApiError::Server { status, message },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(format!("Invalid JSON: {}", err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<PaymentValidationError> for ApiError {
    fn from(err: PaymentValidationError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

/// The single error object carried on state records.
///
/// Transport failures and server business errors look the same here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateError {
    pub code: String,
    pub message: String,
}

impl StateError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ApiError> for StateError {
    fn from(err: &ApiError) -> Self {
        StateError::new(err.error_code(), err.message())
    }
}

impl From<ApiError> for StateError {
    fn from(err: ApiError) -> Self {
        StateError::from(&err)
    }
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StateError {}
