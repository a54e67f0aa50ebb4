//! Custom error types for flexbackup-manager
//!
//! This module defines the error hierarchy for the scheduler using thiserror
//! for ergonomic error definitions. Variants follow the three failure classes
//! the scheduler distinguishes:
//!
//! - configuration errors abort before anything is scheduled or deleted
//! - collaborator errors (archiver runs, directory listings) are logged and
//!   only abandon the affected backup set
//! - removal errors during garbage collection abort the whole invocation

use thiserror::Error;

/// The main error type for flexbackup-manager operations
#[derive(Error, Debug)]
pub enum BackupError {
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The archiver failed for a backup set
    #[error("Backup of '{set}' failed: {reason}")]
    Runner { set: String, reason: String },

    /// A backup set's store directory could not be listed
    #[error("Failed to list snapshots of '{set}': {reason}")]
    Listing { set: String, reason: String },

    /// A stale snapshot could not be deleted
    #[error("Failed to remove snapshot '{path}': {reason}")]
    Removal { path: String, reason: String },

    /// Archiver configuration template errors
    #[error("Template error: {0}")]
    Template(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl BackupError {
    /// Create a "not found" error for backup sets
    pub fn set_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup set",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for directories
    pub fn directory_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Directory",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error must stop the whole invocation
    ///
    /// Runner and listing failures only affect one backup set.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Runner { .. } | Self::Listing { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for flexbackup-manager operations
pub type BackupResult<T> = Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackupError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
        assert!(err.is_config());
    }

    #[test]
    fn test_not_found_error() {
        let err = BackupError::set_not_found("photos");
        assert_eq!(err.to_string(), "Backup set not found: photos");
    }

    #[test]
    fn test_removal_error_is_fatal() {
        let err = BackupError::Removal {
            path: "/backup/a/2023-01-01".into(),
            reason: "permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to remove snapshot '/backup/a/2023-01-01': permission denied"
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_collaborator_errors_are_not_fatal() {
        let runner = BackupError::Runner {
            set: "a".into(),
            reason: "exit status 2".into(),
        };
        let listing = BackupError::Listing {
            set: "a".into(),
            reason: "denied".into(),
        };
        assert!(!runner.is_fatal());
        assert!(!listing.is_fatal());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BackupError = io_err.into();
        assert!(matches!(err, BackupError::Io(_)));
    }
}
