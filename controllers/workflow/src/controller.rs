//! Main controller loop.
//!
//! Watches Workflow resources and invokes the reconciler once per pass,
//! using kube_runtime::Controller for reconnection, retry, and requeue
//! scheduling. The reconciler itself decides whether a Workflow needs
//! another pass; failed passes are retried on a fixed delay by the error
//! policy.

use crate::error::ControllerError;
use crate::reconciler::{JobAdvance, Reconciler};
use crds::Workflow;
use futures::StreamExt;
use kube::{Api, Client};
use kube_runtime::{
    controller::{Action, Config as ControllerConfig},
    watcher, Controller as WorkflowController,
};
use machine_store::KubeMachineStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// How soon a requeued Workflow is reconciled again
const REQUEUE_DELAY: Duration = Duration::from_secs(5);

/// Delay before retrying a failed reconciliation pass
const ERROR_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Main controller for Workflow boot automation.
pub struct Controller {
    client: Client,
    namespace: String,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(namespace: Option<String>) -> Result<Self, ControllerError> {
        info!("Initializing Workflow Controller");

        let client = Client::try_default().await?;

        Ok(Self {
            client,
            namespace: namespace.unwrap_or_else(|| "default".to_string()),
        })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("Workflow Controller running");

        let workflows: Api<Workflow> = Api::namespaced(self.client.clone(), &self.namespace);
        let store = Arc::new(KubeMachineStore::new(self.client.clone()));
        let reconciler = Arc::new(Reconciler::new(store));

        // Error policy: requeue with a fixed delay; the pass re-reads fresh
        // state, so conflicts and transient store errors self-heal.
        let error_policy = |obj: Arc<Workflow>, error: &ControllerError, _ctx: Arc<Reconciler>| {
            error!(
                "Reconciliation error for workflow {:?}: {}",
                obj.metadata.name, error
            );
            Action::requeue(ERROR_RETRY_DELAY)
        };

        let reconcile = |obj: Arc<Workflow>, ctx: Arc<Reconciler>| async move {
            debug!("Reconciling workflow {:?}", obj.metadata.name);
            match ctx.reconcile(&obj).await? {
                JobAdvance::Requeue => Ok(Action::requeue(REQUEUE_DELAY)),
                JobAdvance::Done => Ok(Action::await_change()),
            }
        };

        // Debounce batches bursts of status updates; concurrency bounds how
        // many Workflows reconcile at once.
        let controller_config = ControllerConfig::default()
            .debounce(Duration::from_secs(1))
            .concurrency(3);

        WorkflowController::new(workflows, watcher::Config::default())
            .with_config(controller_config)
            .run(reconcile, error_policy, reconciler)
            .for_each(|res| async move {
                if let Err(e) = res {
                    error!("Controller error: {}", e);
                }
            })
            .await;

        Ok(())
    }
}
