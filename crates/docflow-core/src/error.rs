//! Error types module
//!
//! All errors raised by the docflow engine are unified under the `AppError`
//! enum: validation, ownership, lifecycle-state, signature, storage, and
//! document-store errors.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx`
//! feature. With `default-features = false` there is no database variant and
//! persistence failures must be mapped to `Internal`.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
/// The request boundary uses this to build client responses without matching
/// on variants itself.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_SIGNATURE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation not allowed in current state: {0}")]
    InvalidState(String),

    #[error("Payment signature verification failed: {0}")]
    InvalidSignature(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata per variant: (http_status, error_code, recoverable, log_level).
fn static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Validation(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::Forbidden(_) => (403, "FORBIDDEN", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::InvalidState(_) => (409, "INVALID_STATE", false, LogLevel::Debug),
        AppError::InvalidSignature(_) => (400, "INVALID_SIGNATURE", false, LogLevel::Warn),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        #[cfg(feature = "sqlx")]
        AppError::Database(_) => (500, "DATABASE_ERROR", true, LogLevel::Error),
        AppError::Config(_) => (500, "CONFIG_ERROR", false, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidState(msg) => msg.clone(),
            AppError::InvalidSignature(_) => "Payment verification failed".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            #[cfg(feature = "sqlx")]
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Config(_) => "Service misconfigured".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_metadata() {
        let err = AppError::Validation("file size must be positive".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "file size must be positive");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_invalid_signature_hides_detail() {
        let err = AppError::InvalidSignature("hmac mismatch for order_x".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_SIGNATURE");
        // internal detail must not leak into the client message
        assert_eq!(err.client_message(), "Payment verification failed");
    }

    #[test]
    fn test_storage_recoverable() {
        let err = AppError::Storage("timeout after 3 attempts".to_string());
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Error);
        assert_eq!(err.client_message(), "Failed to access storage");
    }

    #[test]
    fn test_invalid_state_conflict() {
        let err = AppError::InvalidState("completed files cannot be edited".to_string());
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_STATE");
    }
}
