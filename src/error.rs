//! Error types for the Stride recommendation system
//!
//! This module provides structured error definitions using thiserror, with
//! anyhow errors folded into the `Other` variant for propagation.

use thiserror::Error;

/// Main error type for Stride operations
#[derive(Error, Debug)]
pub enum StrideError {
    /// Student reference does not resolve
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    /// Class reference does not resolve
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// Activity reference does not resolve
    #[error("Activity not found: {0}")]
    ActivityNotFound(String),

    /// Malformed request, preference or filter input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence collaborator failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration file could not be parsed
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid entity ID format
    #[error("Invalid ID: {0}")]
    InvalidId(#[from] uuid::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl StrideError {
    /// Whether this error means a referenced entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StrideError::StudentNotFound(_)
                | StrideError::ClassNotFound(_)
                | StrideError::ActivityNotFound(_)
        )
    }
}

/// Result type alias for Stride operations
pub type Result<T> = std::result::Result<T, StrideError>;

/// Convert anyhow::Error to StrideError
impl From<anyhow::Error> for StrideError {
    fn from(err: anyhow::Error) -> Self {
        StrideError::Other(err.to_string())
    }
}
