//! Core domain errors.

use thiserror::Error;

/// Core domain errors for flowctl.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Worker group name is empty or contains reserved characters.
    #[error("Invalid worker group name: '{0}'")]
    InvalidWorkerGroupName(String),

    /// Registry path is not absolute or has empty segments.
    #[error("Invalid registry path: '{0}'")]
    InvalidPath(String),

    /// Project code could not be parsed.
    #[error("Invalid project code: '{0}'")]
    InvalidProjectCode(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
