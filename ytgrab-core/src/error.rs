//! Error types for the ytgrab-core library.
//!
//! All fallible core operations return [`CoreResult`]. The variants split
//! roughly into resolver errors (`NoFormatsAvailable`, `InvalidRequest`),
//! external tool errors (`DependencyNotFound`, `CommandStart`,
//! `CommandFailed`, `JsonParse`), and filesystem/config errors.

use std::process::ExitStatus;
use thiserror::Error;

/// Custom error types for ytgrab
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no formats available for this media item")]
    NoFormatsAvailable,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid or unsupported URL: {0}")]
    InvalidUrl(String),

    #[error("required external tool '{0}' not found in PATH")]
    DependencyNotFound(String),

    #[error("failed to start command '{cmd}': {source}")]
    CommandStart {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command '{cmd}' failed with status {status}: {stderr}")]
    CommandFailed {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("probe failed: {0}")]
    Probe(String),

    #[error("no processable video files found")]
    NoFilesFound,

    #[error("invalid path: {0}")]
    PathError(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for ytgrab-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CommandStart` error for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, source: std::io::Error) -> CoreError {
    CoreError::CommandStart {
        cmd: cmd.into(),
        source,
    }
}

/// Builds a `CommandFailed` error from a non-zero exit and captured stderr.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        cmd: cmd.into(),
        status,
        stderr: stderr.into(),
    }
}
