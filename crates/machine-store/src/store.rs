//! Kubernetes-backed machine store
//!
//! Implements the store trait over `kube::Api` handles. One store instance
//! serves all namespaces; each call builds the namespaced API handle it
//! needs from the shared client.

use crate::error::StoreError;
use crate::store_trait::MachineStoreTrait;
use crds::{BmcJob, Hardware, Workflow};
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;
use tracing::debug;

/// Resource store backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeMachineStore {
    client: Client,
}

impl std::fmt::Debug for KubeMachineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeMachineStore").finish_non_exhaustive()
    }
}

impl KubeMachineStore {
    /// Create a store over the given Kubernetes client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn workflows(&self, namespace: &str) -> Api<Workflow> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn hardware(&self, namespace: &str) -> Api<Hardware> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn jobs(&self, namespace: &str) -> Api<BmcJob> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn object_meta<'a>(
    namespace: Option<&'a str>,
    name: Option<&'a str>,
    kind: &str,
) -> Result<(&'a str, &'a str), StoreError> {
    let name = name.ok_or_else(|| StoreError::InvalidObject(format!("{kind} missing name")))?;
    let namespace = namespace.unwrap_or("default");
    Ok((namespace, name))
}

#[async_trait::async_trait]
impl MachineStoreTrait for KubeMachineStore {
    async fn get_workflow(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Workflow>, StoreError> {
        self.workflows(namespace)
            .get_opt(name)
            .await
            .map_err(Into::into)
    }

    async fn update_workflow_status(&self, workflow: &Workflow) -> Result<Workflow, StoreError> {
        let (namespace, name) = object_meta(
            workflow.metadata.namespace.as_deref(),
            workflow.metadata.name.as_deref(),
            "Workflow",
        )?;
        debug!("Updating workflow {}/{} status", namespace, name);

        // replace_status carries the object's resourceVersion, so a
        // concurrent writer surfaces as a 409 conflict.
        let data = serde_json::to_vec(workflow)?;
        self.workflows(namespace)
            .replace_status(name, &PostParams::default(), data)
            .await
            .map_err(Into::into)
    }

    async fn get_hardware(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Hardware>, StoreError> {
        self.hardware(namespace)
            .get_opt(name)
            .await
            .map_err(Into::into)
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Option<BmcJob>, StoreError> {
        self.jobs(namespace).get_opt(name).await.map_err(Into::into)
    }

    async fn create_job(&self, job: &BmcJob) -> Result<BmcJob, StoreError> {
        let (namespace, name) = object_meta(
            job.metadata.namespace.as_deref(),
            job.metadata.name.as_deref(),
            "BmcJob",
        )?;
        debug!("Creating job {}/{}", namespace, name);

        self.jobs(namespace)
            .create(&PostParams::default(), job)
            .await
            .map_err(Into::into)
    }

    async fn delete_job(
        &self,
        namespace: &str,
        name: &str,
        params: &DeleteParams,
    ) -> Result<(), StoreError> {
        debug!("Deleting job {}/{}", namespace, name);

        match self.jobs(namespace).delete(name, params).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
