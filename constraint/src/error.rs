//! Constraint error types.
//!
//! These are programming errors, not data errors: a bad pattern at
//! declaration time or an entity of the wrong kind reaching a typed check.

use thiserror::Error;

/// Result type for constraint operations.
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Errors that can occur while declaring or evaluating constraints.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Entity kind mismatch: expected {expected}, got {actual}")]
    KindMismatch { expected: String, actual: String },
}

impl ConstraintError {
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub fn kind_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::KindMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
