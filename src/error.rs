//! Error types for devtools operations.
//!
//! This module defines [`DevtoolsError`], the primary error type used for
//! run-level failures, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `DevtoolsError` for failures that stop a whole command (unreadable
//!   config, a catalogue file that is not YAML at all)
//! - Per-entry problems are values, not errors: see
//!   [`CatalogueError`](crate::catalogue::CatalogueError) and
//!   [`Outcome`](crate::reconcile::Outcome)
//! - Use `anyhow::Error` (via `DevtoolsError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for devtools operations.
#[derive(Debug, Error)]
pub enum DevtoolsError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A catalogue source could not be read or is not a catalogue at all.
    #[error("Failed to load catalogue {source_name}: {message}")]
    CatalogueLoad {
        source_name: String,
        message: String,
    },

    /// Shell command could not be started.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for devtools operations.
pub type Result<T> = std::result::Result<T, DevtoolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = DevtoolsError::ConfigNotFound {
            path: PathBuf::from("/foo/config.yml"),
        };
        assert!(err.to_string().contains("/foo/config.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = DevtoolsError::ConfigParseError {
            path: PathBuf::from("/config.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn catalogue_load_displays_source_and_message() {
        let err = DevtoolsError::CatalogueLoad {
            source_name: "builtin:rust.yml".into(),
            message: "expected a sequence".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("builtin:rust.yml"));
        assert!(msg.contains("expected a sequence"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = DevtoolsError::CommandFailed {
            command: "apt-get install -y just".into(),
            code: Some(100),
        };
        let msg = err.to_string();
        assert!(msg.contains("apt-get install -y just"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: DevtoolsError = io_err.into();
        assert!(matches!(err, DevtoolsError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts() {
        let err: DevtoolsError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, DevtoolsError::Other(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
