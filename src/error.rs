//! Error handling for Sonora
//!
//! Every failure the engine can report is a `SonoraError`. None of them are
//! retried internally; the caller decides what to do next.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Sonora operations
pub type Result<T> = std::result::Result<T, SonoraError>;

/// Main error type for Sonora operations
#[derive(Error, Debug)]
pub enum SonoraError {
    // Input Errors
    #[error("Invalid style: {field}: {reason}")]
    InvalidStyle { field: String, reason: String },

    #[error("Unsupported genre: {genre}")]
    UnsupportedGenre { genre: String },

    #[error("Invalid artifact name: {name:?}")]
    InvalidName { name: String },

    // Storage Errors
    #[error("Quota exceeded for user {user_id}: {reason}")]
    QuotaExceeded { user_id: String, reason: String },

    #[error("Artifact name already in use: {name}")]
    NameTaken { name: String },

    #[error("Artifact not found: {name}")]
    NotFound { name: String },

    #[error("Export failed: {path}: {source}")]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Codec Errors
    #[error("Invalid audio container: {reason}")]
    InvalidAudio { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SonoraError {
    /// Shorthand for an `InvalidStyle` error on one field
    pub fn invalid_style(field: &str, reason: impl Into<String>) -> Self {
        SonoraError::InvalidStyle {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SonoraError::InvalidStyle { .. } => "INVALID_STYLE",
            SonoraError::UnsupportedGenre { .. } => "UNSUPPORTED_GENRE",
            SonoraError::InvalidName { .. } => "INVALID_NAME",
            SonoraError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            SonoraError::NameTaken { .. } => "NAME_TAKEN",
            SonoraError::NotFound { .. } => "NOT_FOUND",
            SonoraError::ExportFailed { .. } => "EXPORT_FAILED",
            SonoraError::InvalidAudio { .. } => "INVALID_AUDIO",
            SonoraError::InvalidConfig { .. } => "INVALID_CONFIG",
            SonoraError::Io(_) => "IO_ERROR",
            SonoraError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Transport status a request-facing collaborator should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            SonoraError::InvalidStyle { .. }
            | SonoraError::UnsupportedGenre { .. }
            | SonoraError::InvalidName { .. }
            | SonoraError::QuotaExceeded { .. } => 400,
            SonoraError::NotFound { .. } => 404,
            SonoraError::NameTaken { .. } => 409,
            _ => 500,
        }
    }

    /// True when the caller has to change its request (or free space)
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = SonoraError::UnsupportedGenre {
            genre: "dubstep".to_string(),
        };
        assert_eq!(err.error_code(), "UNSUPPORTED_GENRE");
        assert_eq!(err.to_string(), "Unsupported genre: dubstep");
    }

    #[test]
    fn test_status_mapping() {
        let quota = SonoraError::QuotaExceeded {
            user_id: "u1".to_string(),
            reason: "file count".to_string(),
        };
        assert_eq!(quota.status_code(), 400);
        assert!(quota.is_client_error());

        let missing = SonoraError::NotFound {
            name: "song".to_string(),
        };
        assert_eq!(missing.status_code(), 404);

        let export = SonoraError::ExportFailed {
            path: PathBuf::from("/tmp/x.wav"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(export.status_code(), 500);
        assert!(!export.is_client_error());
    }
}
