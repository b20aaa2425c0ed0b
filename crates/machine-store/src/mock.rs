//! Mock machine store for unit testing
//!
//! In-memory implementation of the store trait. Tests seed it with objects,
//! inject per-operation failures, and read call counters to assert how many
//! side-effecting calls a reconciliation pass actually issued.

use crate::error::StoreError;
use crate::store_trait::MachineStoreTrait;
use crds::{BmcJob, Hardware, Workflow};
use kube::api::DeleteParams;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Key = (String, String);

/// Mock store for testing
#[derive(Clone, Default)]
pub struct MockMachineStore {
    workflows: Arc<Mutex<HashMap<Key, Workflow>>>,
    hardware: Arc<Mutex<HashMap<Key, Hardware>>>,
    jobs: Arc<Mutex<HashMap<Key, BmcJob>>>,
    // Call counters
    create_job_calls: Arc<Mutex<u64>>,
    delete_job_calls: Arc<Mutex<u64>>,
    jobs_deleted: Arc<Mutex<u64>>,
    status_updates: Arc<Mutex<u64>>,
    // Injectable failures, consumed by the next matching call
    fail_next_create: Arc<Mutex<Option<String>>>,
    fail_next_delete: Arc<Mutex<Option<String>>>,
    fail_next_get_job: Arc<Mutex<Option<String>>>,
    conflict_next_update: Arc<Mutex<bool>>,
}

impl std::fmt::Debug for MockMachineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMachineStore").finish_non_exhaustive()
    }
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

fn object_key(
    namespace: Option<&str>,
    name: Option<&str>,
    kind: &str,
) -> Result<Key, StoreError> {
    let name = name.ok_or_else(|| StoreError::InvalidObject(format!("{kind} missing name")))?;
    Ok(key(namespace.unwrap_or("default"), name))
}

impl MockMachineStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a Workflow (for test setup)
    pub fn add_workflow(&self, workflow: Workflow) {
        let k = object_key(
            workflow.metadata.namespace.as_deref(),
            workflow.metadata.name.as_deref(),
            "Workflow",
        )
        .unwrap();
        self.workflows.lock().unwrap().insert(k, workflow);
    }

    /// Seed a Hardware record (for test setup)
    pub fn add_hardware(&self, hardware: Hardware) {
        let k = object_key(
            hardware.metadata.namespace.as_deref(),
            hardware.metadata.name.as_deref(),
            "Hardware",
        )
        .unwrap();
        self.hardware.lock().unwrap().insert(k, hardware);
    }

    /// Seed a BmcJob (for test setup)
    pub fn add_job(&self, job: BmcJob) {
        let k = object_key(
            job.metadata.namespace.as_deref(),
            job.metadata.name.as_deref(),
            "BmcJob",
        )
        .unwrap();
        self.jobs.lock().unwrap().insert(k, job);
    }

    /// Stored BmcJob, if any (for test assertions)
    pub fn job(&self, namespace: &str, name: &str) -> Option<BmcJob> {
        self.jobs.lock().unwrap().get(&key(namespace, name)).cloned()
    }

    /// Stored Workflow, if any (for test assertions)
    pub fn workflow(&self, namespace: &str, name: &str) -> Option<Workflow> {
        self.workflows
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
    }

    /// Number of create_job calls issued so far
    pub fn create_job_calls(&self) -> u64 {
        *self.create_job_calls.lock().unwrap()
    }

    /// Number of delete_job calls issued so far
    pub fn delete_job_calls(&self) -> u64 {
        *self.delete_job_calls.lock().unwrap()
    }

    /// Number of delete_job calls that actually found a job to remove
    pub fn jobs_deleted(&self) -> u64 {
        *self.jobs_deleted.lock().unwrap()
    }

    /// Number of workflow status updates issued so far
    pub fn status_updates(&self) -> u64 {
        *self.status_updates.lock().unwrap()
    }

    /// Make the next create_job call fail with the given message
    pub fn fail_next_create(&self, message: &str) {
        *self.fail_next_create.lock().unwrap() = Some(message.to_string());
    }

    /// Make the next delete_job call fail with the given message
    pub fn fail_next_delete(&self, message: &str) {
        *self.fail_next_delete.lock().unwrap() = Some(message.to_string());
    }

    /// Make the next get_job call fail with the given message
    pub fn fail_next_get_job(&self, message: &str) {
        *self.fail_next_get_job.lock().unwrap() = Some(message.to_string());
    }

    /// Make the next update_workflow_status call fail with a conflict
    pub fn conflict_next_update(&self) {
        *self.conflict_next_update.lock().unwrap() = true;
    }
}

#[async_trait::async_trait]
impl MachineStoreTrait for MockMachineStore {
    async fn get_workflow(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Workflow>, StoreError> {
        Ok(self
            .workflows
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned())
    }

    async fn update_workflow_status(&self, workflow: &Workflow) -> Result<Workflow, StoreError> {
        if std::mem::take(&mut *self.conflict_next_update.lock().unwrap()) {
            return Err(StoreError::Conflict(
                "the object has been modified".to_string(),
            ));
        }
        let k = object_key(
            workflow.metadata.namespace.as_deref(),
            workflow.metadata.name.as_deref(),
            "Workflow",
        )?;
        let mut workflows = self.workflows.lock().unwrap();
        let stored = workflows
            .get(&k)
            .ok_or_else(|| StoreError::InvalidObject(format!("Workflow {} not found", k.1)))?;
        if stored.metadata.resource_version != workflow.metadata.resource_version {
            return Err(StoreError::Conflict(format!(
                "Workflow {} was updated by a concurrent writer",
                k.1
            )));
        }

        let mut updated = workflow.clone();
        let version: u64 = stored
            .metadata
            .resource_version
            .as_deref()
            .unwrap_or("0")
            .parse()
            .unwrap_or(0);
        updated.metadata.resource_version = Some((version + 1).to_string());
        workflows.insert(k, updated.clone());
        *self.status_updates.lock().unwrap() += 1;
        Ok(updated)
    }

    async fn get_hardware(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Hardware>, StoreError> {
        Ok(self
            .hardware
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned())
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Option<BmcJob>, StoreError> {
        if let Some(message) = self.fail_next_get_job.lock().unwrap().take() {
            return Err(StoreError::Kube(kube::Error::Api(
                kube::core::ErrorResponse {
                    status: "Failure".to_string(),
                    message,
                    reason: "InternalError".to_string(),
                    code: 500,
                },
            )));
        }
        Ok(self.jobs.lock().unwrap().get(&key(namespace, name)).cloned())
    }

    async fn create_job(&self, job: &BmcJob) -> Result<BmcJob, StoreError> {
        *self.create_job_calls.lock().unwrap() += 1;
        if let Some(message) = self.fail_next_create.lock().unwrap().take() {
            return Err(StoreError::InvalidObject(message));
        }
        let k = object_key(
            job.metadata.namespace.as_deref(),
            job.metadata.name.as_deref(),
            "BmcJob",
        )?;
        let mut created = job.clone();
        created.metadata.uid = Some(uuid::Uuid::new_v4().to_string());
        created.metadata.resource_version = Some("1".to_string());
        self.jobs.lock().unwrap().insert(k, created.clone());
        Ok(created)
    }

    async fn delete_job(
        &self,
        namespace: &str,
        name: &str,
        _params: &DeleteParams,
    ) -> Result<(), StoreError> {
        *self.delete_job_calls.lock().unwrap() += 1;
        if let Some(message) = self.fail_next_delete.lock().unwrap().take() {
            return Err(StoreError::InvalidObject(message));
        }
        // "not found" is not an error, matching the real store
        if self
            .jobs
            .lock()
            .unwrap()
            .remove(&key(namespace, name))
            .is_some()
        {
            *self.jobs_deleted.lock().unwrap() += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;

    fn workflow(name: &str) -> Workflow {
        Workflow {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                resource_version: Some("1".to_string()),
                ..Default::default()
            },
            spec: crds::WorkflowSpec {
                hardware_ref: "machine-0".to_string(),
                boot_options: None,
            },
            status: None,
        }
    }

    #[tokio::test]
    async fn test_update_workflow_status_bumps_resource_version() {
        let store = MockMachineStore::new();
        store.add_workflow(workflow("wf"));

        let wf = store.get_workflow("default", "wf").await.unwrap().unwrap();
        let updated = store.update_workflow_status(&wf).await.unwrap();

        assert_eq!(updated.metadata.resource_version.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_update_workflow_status_conflicts_on_stale_version() {
        let store = MockMachineStore::new();
        store.add_workflow(workflow("wf"));

        let stale = store.get_workflow("default", "wf").await.unwrap().unwrap();
        store.update_workflow_status(&stale).await.unwrap();

        // A second write from the same observed version must conflict
        let err = store.update_workflow_status(&stale).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_delete_job_swallows_not_found() {
        let store = MockMachineStore::new();

        let result = store
            .delete_job("default", "netboot", &DeleteParams::default())
            .await;

        assert!(result.is_ok());
        assert_eq!(store.delete_job_calls(), 1);
        assert_eq!(store.jobs_deleted(), 0);
    }
}
