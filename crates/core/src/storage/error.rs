//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The artifact has validation errors and may not be persisted.
    #[error("artifact has {count} validation error(s) and cannot be persisted")]
    ReleaseBlocked {
        /// Number of validation errors.
        count: usize,
    },

    /// Artifact not found in storage.
    #[error("artifact not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),

    /// Stored bytes are not valid UTF-8.
    #[error("artifact {key} is not valid UTF-8")]
    InvalidContent {
        /// Storage key of the artifact.
        key: String,
    },
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Returns the error code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ReleaseBlocked { .. } => "RELEASE_BLOCKED",
            Self::NotFound { .. } => "ARTIFACT_NOT_FOUND",
            Self::Configuration(_) => "STORAGE_CONFIGURATION",
            Self::Operation(_) => "STORAGE_OPERATION",
            Self::InvalidContent { .. } => "INVALID_CONTENT",
        }
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }
}
