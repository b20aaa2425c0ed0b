//! Machine store errors

use thiserror::Error;

/// Errors that can occur when accessing the resource store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[source] kube::Error),

    /// A concurrent writer updated the object since it was read
    #[error("conflict: {0}")]
    Conflict(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The object is missing a required metadata field
    #[error("invalid object: {0}")]
    InvalidObject(String),
}

impl From<kube::Error> for StoreError {
    fn from(err: kube::Error) -> Self {
        if let kube::Error::Api(ref resp) = err {
            if resp.code == 409 {
                return StoreError::Conflict(resp.message.clone());
            }
        }
        StoreError::Kube(err)
    }
}

impl StoreError {
    /// True when the error is a retryable optimistic-concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}
