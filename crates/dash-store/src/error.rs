//! Remote store error types.

use thiserror::Error;

/// Failure of a single remote store call.
///
/// Callers only look at the variant and the message; transport details such
/// as headers never leave the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The requested study or object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote side answered but refused the operation.
    #[error("rejected ({status}): {message}")]
    Rejected {
        /// Status code reported by the remote side.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The request never produced an answer (connection, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The operation was cancelled before it started.
    #[error("cancelled before start")]
    Cancelled,

    /// The object-store backend reported an error.
    #[error("backend error: {0}")]
    Backend(String),

    /// The remote side answered with something that is not a study document.
    #[error("invalid response: {0}")]
    Parse(String),

    /// The store could not be built from configuration.
    #[error("store configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<object_store::Error> for StoreError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => Self::NotFound(path),
            other => Self::Backend(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<dash_config::ConfigError> for StoreError {
    fn from(err: dash_config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
