//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input data supplied by a collaborator is unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The artifact has validation errors and may not be released.
    #[error("Export blocked by {0} validation error(s)")]
    ReleaseBlocked(usize),

    /// Artifact storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 78,
            Self::InvalidInput(_) => 65,
            Self::ReleaseBlocked(_) => 2,
            Self::Storage(_) => 74,
        }
    }

    /// Returns the stable error code used in logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ReleaseBlocked(_) => "RELEASE_BLOCKED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
