//! Custom error types for audit-trail
//!
//! This module defines the error hierarchy for the library using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for audit-trail operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// Setup-time configuration errors (bad field kinds, duplicate fields)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An actor that is not a valid identity was supplied
    #[error("Invalid actor: {0}")]
    InvalidActor(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl AuditError {
    /// Create a "not found" error for trails
    pub fn trail_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Trail",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for audited entities
    pub fn entity_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Entity",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for actors
    pub fn actor_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Actor",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is an invalid actor error
    pub fn is_invalid_actor(&self) -> bool {
        matches!(self, Self::InvalidActor(_))
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for AuditError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

/// Result type alias for audit-trail operations
pub type AuditResult<T> = Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuditError::Configuration("Unknown field kind 'blob'".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown field kind 'blob'"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_not_found_error() {
        let err = AuditError::trail_not_found("trl-1234abcd");
        assert_eq!(err.to_string(), "Trail not found: trl-1234abcd");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_actor_error() {
        let err = AuditError::InvalidActor("username cannot be empty".into());
        assert!(err.is_invalid_actor());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let audit_err: AuditError = io_err.into();
        assert!(matches!(audit_err, AuditError::Io(_)));
    }
}
