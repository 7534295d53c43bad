//! Error types module
//!
//! All gateway failures are unified under [`GatewayError`]. Each variant describes
//! how it should be presented through [`ErrorMetadata`]: validation problems are shown
//! to the user verbatim, integration mistakes are logged as caller bugs, and backend
//! failures are reduced to a generic message with the detail kept in the logs.

use crate::metadata::MetadataField;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for caller mistakes that indicate a bug upstream
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Describes how an error should be presented to the caller
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from the end user
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// File rejected by the context policy (size or content type).
    #[error("{0}")]
    Validation(String),

    /// A field the context's key layout needs was not supplied.
    #[error("{reason}")]
    MissingMetadata {
        field: MetadataField,
        reason: String,
    },

    /// A folder or metadata value cannot be used as a key segment.
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    /// Blank or otherwise unusable context/bucket identifier.
    #[error("Unknown storage context: {0}")]
    UnknownContext(String),

    /// The object store failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

const BACKEND_CLIENT_MESSAGE: &str = "Upload failed. Please try again.";

impl GatewayError {
    pub fn missing_user_id() -> Self {
        GatewayError::MissingMetadata {
            field: MetadataField::UserId,
            reason: "userId is required for all uploads for security".to_string(),
        }
    }

    pub fn missing_field(field: MetadataField, context: &str) -> Self {
        GatewayError::MissingMetadata {
            field,
            reason: format!("{} is required for {}", field, context),
        }
    }

    /// Get the error type name for structured logs
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "Validation",
            GatewayError::MissingMetadata { .. } => "MissingMetadata",
            GatewayError::InvalidPath(_) => "InvalidPath",
            GatewayError::UnknownContext(_) => "UnknownContext",
            GatewayError::Backend(_) => "Backend",
        }
    }
}

impl ErrorMetadata for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "VALIDATION_ERROR",
            GatewayError::MissingMetadata { .. } => "MISSING_METADATA",
            GatewayError::InvalidPath(_) => "INVALID_PATH",
            GatewayError::UnknownContext(_) => "UNKNOWN_CONTEXT",
            GatewayError::Backend(_) => "STORAGE_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            GatewayError::Backend(_) => BACKEND_CLIENT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        matches!(self, GatewayError::Backend(_))
    }

    fn log_level(&self) -> LogLevel {
        match self {
            GatewayError::Validation(_) => LogLevel::Debug,
            GatewayError::MissingMetadata { .. }
            | GatewayError::InvalidPath(_)
            | GatewayError::UnknownContext(_) => LogLevel::Warn,
            GatewayError::Backend(_) => LogLevel::Error,
        }
    }
}
