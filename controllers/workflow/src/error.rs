//! Controller-specific error types.
//!
//! Each side-effecting phase wraps its failures with a stable prefix
//! ("error deleting job", "error creating job", "error getting job") so
//! operators can tell the phases apart from log and condition text alone.

use machine_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the Workflow Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Resource store error outside a named phase
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Deleting a stale automation job failed
    #[error("error deleting job {name}: {source}")]
    JobDelete {
        /// Automation job name
        name: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// Creating an automation job failed
    #[error("error creating job {name}: {source}")]
    JobCreate {
        /// Automation job name
        name: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// Fetching an automation job failed
    #[error("error getting job {name}: {source}")]
    JobGet {
        /// Automation job name
        name: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// A tracked job vanished after its identity was recorded
    #[error("error getting job {0}: job no longer exists")]
    JobDisappeared(String),

    /// Fetching the Hardware record failed
    #[error("error getting hardware {name}: {source}")]
    HardwareGet {
        /// Hardware name
        name: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// The Workflow references a Hardware record that does not exist
    #[error("error getting hardware {0}: hardware not found")]
    HardwareNotFound(String),

    /// The Hardware has no BMC reference; permanent for this Workflow
    #[error("hardware {0:?} does not have a BMC")]
    MissingBmc(String),

    /// The automation job reported failure
    #[error("job {0} failed")]
    JobFailed(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
