//! Export error types.
//!
//! Structural problems in the exported data are reported as
//! [`ValidationError`](super::validation::ValidationError) values, never as
//! `Err`. The errors here cover configuration, release gating and signature
//! verification.

use thiserror::Error;

/// Errors raised around an export invocation.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Unknown layout kind name.
    #[error("Unknown layout kind: {0}")]
    InvalidLayoutKind(String),

    /// The artifact carries validation errors and cannot be released.
    #[error("Export has {count} validation error(s) and cannot be released")]
    ReleaseBlocked {
        /// Number of validation errors.
        count: usize,
    },
}

impl ExportError {
    /// Returns the error code for logs and callers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidLayoutKind(_) => "INVALID_LAYOUT_KIND",
            Self::ReleaseBlocked { .. } => "RELEASE_BLOCKED",
        }
    }
}

/// Errors from key import or signature verification.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Key material is not valid hex.
    #[error("Invalid key encoding: {0}")]
    InvalidEncoding(String),

    /// Private key bytes are not a valid P-256 scalar.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Public key bytes are not a valid SEC1 point.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The supplied public key does not belong to the private key.
    #[error("Public key does not match private key")]
    KeyMismatch,

    /// An asymmetric signature block has no public key.
    #[error("Signature block has no public key")]
    MissingPublicKey,

    /// Signature bytes are malformed.
    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),

    /// Recomputed digest differs from the recorded one.
    #[error("Digest mismatch")]
    DigestMismatch,

    /// Signature does not verify against the content.
    #[error("Signature verification failed")]
    VerificationFailed,
}

impl SignatureError {
    /// Returns the error code for logs and callers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEncoding(_) => "INVALID_KEY_ENCODING",
            Self::InvalidPrivateKey(_) => "INVALID_PRIVATE_KEY",
            Self::InvalidPublicKey(_) => "INVALID_PUBLIC_KEY",
            Self::KeyMismatch => "KEY_MISMATCH",
            Self::MissingPublicKey => "MISSING_PUBLIC_KEY",
            Self::InvalidSignature(_) => "INVALID_SIGNATURE",
            Self::DigestMismatch => "DIGEST_MISMATCH",
            Self::VerificationFailed => "VERIFICATION_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ExportError::InvalidLayoutKind("x".into()).error_code(),
            "INVALID_LAYOUT_KIND"
        );
        assert_eq!(
            ExportError::ReleaseBlocked { count: 1 }.error_code(),
            "RELEASE_BLOCKED"
        );
        assert_eq!(SignatureError::KeyMismatch.error_code(), "KEY_MISMATCH");
        assert_eq!(
            SignatureError::DigestMismatch.error_code(),
            "DIGEST_MISMATCH"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ExportError::ReleaseBlocked { count: 2 }.to_string(),
            "Export has 2 validation error(s) and cannot be released"
        );
        assert_eq!(
            SignatureError::InvalidEncoding("odd length".into()).to_string(),
            "Invalid key encoding: odd length"
        );
    }
}
