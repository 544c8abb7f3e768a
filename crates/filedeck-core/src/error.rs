//! Unified application error types for FileDeck.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The HTTP layer owns the mapping
//! from [`ErrorKind`] to status codes.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The referenced folder, file, or parent does not exist.
    NotFound,
    /// A sibling with the same name already exists.
    Conflict,
    /// The operation is structurally forbidden (self-parenting, cyclic move).
    InvalidOperation,
    /// A folder still has children and the recursive flag was not given.
    NotEmpty,
    /// Input validation failed before any persistence call.
    Validation,
    /// The caller identity is missing or malformed.
    Unauthorized,
    /// A storage I/O error occurred.
    Storage,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
    /// An unexpected internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code for this kind.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::InvalidOperation => "INVALID_OPERATION",
            Self::NotEmpty => "NOT_EMPTY",
            Self::Validation => "VALIDATION",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Storage => "STORAGE_FAILURE",
            Self::Database => "DATABASE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Internal => "INTERNAL",
        }
    }
}

impl ErrorKind {
    /// Parses a code produced by [`ErrorKind::as_code`].
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "NOT_FOUND" => Self::NotFound,
            "CONFLICT" => Self::Conflict,
            "INVALID_OPERATION" => Self::InvalidOperation,
            "NOT_EMPTY" => Self::NotEmpty,
            "VALIDATION" => Self::Validation,
            "UNAUTHORIZED" => Self::Unauthorized,
            "STORAGE_FAILURE" => Self::Storage,
            "DATABASE" => Self::Database,
            "CONFIGURATION" => Self::Configuration,
            "SERIALIZATION" => Self::Serialization,
            "SERVICE_UNAVAILABLE" => Self::ServiceUnavailable,
            "INTERNAL" => Self::Internal,
            _ => return None,
        })
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// The unified application error used throughout FileDeck.
///
/// `details` carries structured context that callers may need to act on,
/// such as the child counts of a [`ErrorKind::NotEmpty`] folder.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional structured details.
    pub details: Option<serde_json::Value>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach structured details to this error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an invalid-operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperation, message)
    }

    /// Create a not-empty error reporting the direct child counts.
    pub fn not_empty(subfolder_count: u64, file_count: u64) -> Self {
        Self::new(
            ErrorKind::NotEmpty,
            "Folder is not empty. Use recursive=true to delete all contents.",
        )
        .with_details(serde_json::json!({
            "has_contents": true,
            "subfolder_count": subfolder_count,
            "file_count": file_count,
        }))
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error means the operation had no effect.
    ///
    /// Storage and internal failures may have left partial state behind.
    pub fn is_no_effect(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::NotFound
                | ErrorKind::Conflict
                | ErrorKind::InvalidOperation
                | ErrorKind::NotEmpty
                | ErrorKind::Validation
                | ErrorKind::Unauthorized
        )
    }

    /// Read an unsigned integer from the structured details.
    pub fn detail_u64(&self, key: &str) -> Option<u64> {
        self.details.as_ref()?.get(key)?.as_u64()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_carries_counts() {
        let err = AppError::not_empty(1, 3);
        assert_eq!(err.kind, ErrorKind::NotEmpty);
        assert_eq!(err.detail_u64("subfolder_count"), Some(1));
        assert_eq!(err.detail_u64("file_count"), Some(3));
        assert!(err.is_no_effect());
    }

    #[test]
    fn test_display_uses_code() {
        let err = AppError::invalid_operation("Cannot move a folder into itself");
        assert_eq!(
            err.to_string(),
            "INVALID_OPERATION: Cannot move a folder into itself"
        );
    }

    #[test]
    fn test_code_parses_back() {
        for kind in [ErrorKind::NotEmpty, ErrorKind::Storage, ErrorKind::Conflict] {
            assert_eq!(ErrorKind::from_code(kind.as_code()), Some(kind));
        }
        assert_eq!(ErrorKind::from_code("TEAPOT"), None);
    }

    #[test]
    fn test_storage_error_is_partial() {
        let err: AppError = std::io::Error::other("disk gone").into();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(!err.is_no_effect());
    }

    #[test]
    fn test_clone_drops_source_keeps_details() {
        let err = AppError::with_source(
            ErrorKind::Database,
            "boom",
            std::io::Error::other("inner"),
        )
        .with_details(serde_json::json!({ "k": 1 }));
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.detail_u64("k"), Some(1));
    }
}
