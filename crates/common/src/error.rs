//! Error types for admarket.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Every handler returns [`AppResult`]; the single [`IntoResponse`]
/// implementation below is the only place errors are mapped to HTTP
/// statuses, so no endpoint carries its own status-mapping logic.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    /// Generic credential failure. Covers both unknown email and wrong
    /// password so responses cannot be used for user enumeration.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Email address has not been verified")]
    EmailNotVerified,

    #[error("Account has not been activated by an administrator")]
    AccountNotActive,

    /// Appeal submitted for an account that is no longer suspended.
    /// Distinct from a validation error so clients can redirect.
    #[error("Account is not suspended")]
    NotSuspended,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Webhook payload failed signature verification.
    #[error("Invalid webhook signature")]
    InvalidSignature,

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::UserNotFound(_) | Self::BookingNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::EmailNotVerified | Self::AccountNotActive | Self::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            Self::NotSuspended
            | Self::BadRequest(_)
            | Self::Validation(_)
            | Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::AccountNotActive => "ACCOUNT_NOT_ACTIVE",
            Self::NotSuspended => "NOT_SUSPENDED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Server-side detail stays in the logs; the response body carries
        // only the code and a generic message for 5xx errors.
        let message = if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
