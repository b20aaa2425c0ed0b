//! Docker client errors

use thiserror::Error;

/// Errors that can occur when talking to the Docker Engine API
#[derive(Debug, Error)]
pub enum DockerError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine returned an error response
    #[error("Docker API error: {0}")]
    Api(String),

    /// An image pull failed and the image is not in the local store
    #[error("DOCKER PULL: {0}")]
    Pull(String),

    /// Image or container not found
    #[error("not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DockerError {
    /// The underlying failure message, without the variant's framing.
    ///
    /// Used when re-wrapping a pull failure so the operator sees the
    /// original engine/transport message, not a nested chain of prefixes.
    pub fn detail(&self) -> String {
        match self {
            DockerError::Api(message) | DockerError::Pull(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
