//! Error types for reaper-daemon

use crate::retry::Conflict;
use reaper_types::{MissingAnnotation, SourceUrlError};
use thiserror::Error;

/// Daemon-level errors. Any of these at startup aborts the process.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cluster connection error
    #[error("Cluster connection error: {0}")]
    Cluster(String),

    /// Source-control client error
    #[error("Source-control client error: {0}")]
    Source(#[from] SourceError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cluster resource store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource was modified concurrently
    #[error("Conflict: {0}")]
    Conflict(String),

    /// API server rejected the request
    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    /// Request never got an answer
    #[error("Transport error: {0}")]
    Transport(String),
}

impl Conflict for StoreError {
    fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl From<kube::Error> for StoreError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) => match resp.code {
                404 => StoreError::NotFound(resp.message),
                409 => StoreError::Conflict(resp.message),
                code => StoreError::Api {
                    code,
                    message: resp.message,
                },
            },
            other => StoreError::Transport(other.to_string()),
        }
    }
}

/// Release manager errors
#[derive(Debug, Clone, Error)]
pub enum ReleaseError {
    /// Release does not exist
    #[error("Release not found: {0}")]
    NotFound(String),

    /// Another operation holds the release
    #[error("Release conflict: {0}")]
    Conflict(String),

    /// Release manager command failed
    #[error("Release command failed: {0}")]
    Command(String),

    /// Could not launch the release manager
    #[error("Release manager unavailable: {0}")]
    Io(String),

    /// Release manager output was not understood
    #[error("Unexpected release manager output: {0}")]
    Parse(String),
}

impl Conflict for ReleaseError {
    fn is_conflict(&self) -> bool {
        matches!(self, ReleaseError::Conflict(_))
    }
}

/// Source-control host errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// Lookup request failed before a response arrived
    #[error("Branch lookup failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Configured API endpoint is unusable
    #[error("Invalid API url: {0}")]
    InvalidApiUrl(String),

    /// Token cannot be sent as a header value
    #[error("Invalid API token")]
    InvalidToken,
}

/// Reasons a teardown stage refuses to let a namespace proceed
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    MissingAnnotation(#[from] MissingAnnotation),

    #[error(transparent)]
    InvalidSourceUrl(#[from] SourceUrlError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for release operations
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Result type alias for source-control operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
