//! Worker-specific error types.

use docker_client::DockerError;
use thiserror::Error;

/// Errors that can occur in the provisioning worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Docker Engine error
    #[error("Docker error: {0}")]
    Docker(#[from] DockerError),

    /// The action container exited with a non-zero status
    #[error("action {name} failed with exit code {exit_code}")]
    ActionFailed {
        /// Action name
        name: String,
        /// Container exit code
        exit_code: i64,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
