//! Domain-specific error types and error handling.

mod verification;

pub use verification::{ThrottleReason, VerificationError};

use thiserror::Error;

/// Failures reported by collaborators (stores, sinks)
///
/// These never reach end users directly; the engine maps them onto
/// [`VerificationError`] and logs the detail.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Internal {
            message: format!("Serialization failed: {}", err),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Result of a verification operation
pub type VerificationResult<T> = Result<T, VerificationError>;
