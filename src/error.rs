//! Error types for Belay operations.
//!
//! This module defines [`BelayError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Graph construction errors (`DuplicateStep`, `UnknownStep`,
//!   `CircularDependency`) are fatal: `build()` returns them synchronously
//!   and no step ever executes.
//! - Execution errors (`LaunchFailed`, `CommandFailed`, `Cancelled`) are
//!   scoped to a single step; the scheduler records them in the step's
//!   report and cascades skips instead of unwinding across step boundaries.
//! - Use `anyhow::Error` (via `BelayError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Belay operations.
#[derive(Debug, Error)]
pub enum BelayError {
    /// Manifest file not found at expected location.
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Failed to parse manifest file.
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParseError { path: PathBuf, message: String },

    /// Invalid manifest structure or values.
    #[error("Invalid manifest: {message}")]
    ManifestValidationError { message: String },

    /// Two steps were registered under the same name.
    #[error("Duplicate step name: '{name}'")]
    DuplicateStep { name: String },

    /// A step declared an edge to a name that is not in the graph.
    #[error("Step '{step}' references unknown step '{target}'")]
    UnknownStep { step: String, target: String },

    /// Step dependency cycle detected.
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// The executable could not be found or started.
    #[error("Failed to launch '{command}': {message}")]
    LaunchFailed { command: String, message: String },

    /// Shell command exited non-zero.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// The run was cancelled before this operation could complete.
    #[error("Run cancelled")]
    Cancelled,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Belay operations.
pub type Result<T> = std::result::Result<T, BelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_not_found_displays_path() {
        let err = BelayError::ManifestNotFound {
            path: PathBuf::from("/foo/belay.yml"),
        };
        assert!(err.to_string().contains("/foo/belay.yml"));
    }

    #[test]
    fn manifest_parse_error_displays_path_and_message() {
        let err = BelayError::ManifestParseError {
            path: PathBuf::from("/belay.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/belay.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn duplicate_step_displays_name() {
        let err = BelayError::DuplicateStep {
            name: "install-app".into(),
        };
        assert!(err.to_string().contains("install-app"));
    }

    #[test]
    fn unknown_step_displays_both_names() {
        let err = BelayError::UnknownStep {
            step: "lint-app".into(),
            target: "instal-app".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("lint-app"));
        assert!(msg.contains("instal-app"));
    }

    #[test]
    fn circular_dependency_displays_cycle() {
        let err = BelayError::CircularDependency {
            cycle: "a -> b -> a".into(),
        };
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn launch_failed_displays_command_and_message() {
        let err = BelayError::LaunchFailed {
            command: "uv sync".into(),
            message: "No such file or directory".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("uv sync"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = BelayError::CommandFailed {
            command: "npm install".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("npm install"));
        assert!(msg.contains("1"));
    }
}
