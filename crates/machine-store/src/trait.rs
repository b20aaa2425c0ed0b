//! Store trait for mocking
//!
//! This trait abstracts the resource store to enable mocking in unit tests.
//! The kube-backed store implements this trait, and tests use the in-memory
//! mock implementation.

use crate::error::StoreError;
use crds::{BmcJob, Hardware, Workflow};
use kube::api::DeleteParams;

/// Trait for resource store operations
///
/// Get operations return `Ok(None)` for missing objects. Deletes swallow
/// "not found", so deleting an absent object is not an error. All async
/// methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait MachineStoreTrait: Send + Sync {
    /// Fetch a Workflow by namespace and name
    async fn get_workflow(&self, namespace: &str, name: &str)
    -> Result<Option<Workflow>, StoreError>;

    /// Replace a Workflow's status, conditional on the resource version
    /// recorded in its metadata. Returns the stored object.
    async fn update_workflow_status(&self, workflow: &Workflow) -> Result<Workflow, StoreError>;

    /// Fetch a Hardware record by namespace and name
    async fn get_hardware(&self, namespace: &str, name: &str)
    -> Result<Option<Hardware>, StoreError>;

    /// Fetch a BmcJob by namespace and name
    async fn get_job(&self, namespace: &str, name: &str) -> Result<Option<BmcJob>, StoreError>;

    /// Create a BmcJob; returns the stored object with its assigned UID
    async fn create_job(&self, job: &BmcJob) -> Result<BmcJob, StoreError>;

    /// Delete a BmcJob; "not found" is not an error
    async fn delete_job(
        &self,
        namespace: &str,
        name: &str,
        params: &DeleteParams,
    ) -> Result<(), StoreError>;
}
