//! Health Signal error types

use thiserror::Error;

/// Health Signal error type
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed scoring input (empty identifiers, out-of-range answers)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record still carries a forbidden field or an unhashed identifier
    #[error("Privacy violation on field '{field}': {reason}")]
    PrivacyViolation {
        /// Offending field name
        field: String,
        /// Why the field is rejected
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage collaborator error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a privacy violation naming the offending field
    pub fn privacy_violation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PrivacyViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Field named by a privacy violation, if this is one
    pub fn violating_field(&self) -> Option<&str> {
        match self {
            Self::PrivacyViolation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type alias for Health Signal operations
pub type Result<T> = std::result::Result<T, Error>;
