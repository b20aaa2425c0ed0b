//! Workflow reconciliation.
//!
//! One reconciliation pass inspects the Workflow's persisted status,
//! performs at most one side-effecting operation per automation job, and
//! persists the mutated status before signalling whether to requeue. The
//! pass can be interrupted and resumed at any point without duplicating
//! side effects because every step records its progress durably first.

pub mod job;
#[cfg(test)]
mod job_test;

use crate::backoff::ExponentialBackoff;
use crate::error::ControllerError;
use crds::{Action, BootDevice, BootMode, Workflow};
use self::job::JobName;
use machine_store::MachineStoreTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default pacing for status polls of a running job
const POLL_INITIAL: Duration = Duration::from_secs(1);
const POLL_MAX: Duration = Duration::from_secs(10);

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAdvance {
    /// More lifecycle work remains; the scheduler should requeue
    Requeue,

    /// Every requested automation job finished its lifecycle; stop
    /// reconciling until the Workflow itself changes
    Done,
}

/// Reconciles the boot-automation jobs of Workflow resources.
pub struct Reconciler {
    store: Arc<dyn MachineStoreTrait>,
    poll_initial: Duration,
    poll_max: Duration,
    // Poll pacing per (namespace, workflow, job), reset on phase change
    poll_backoff: Mutex<HashMap<String, ExponentialBackoff>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a reconciler over the given resource store.
    pub fn new(store: Arc<dyn MachineStoreTrait>) -> Self {
        Self::with_poll_interval(store, POLL_INITIAL, POLL_MAX)
    }

    /// Creates a reconciler with custom poll pacing.
    pub fn with_poll_interval(
        store: Arc<dyn MachineStoreTrait>,
        initial: Duration,
        max: Duration,
    ) -> Self {
        Self {
            store,
            poll_initial: initial,
            poll_max: max,
            poll_backoff: Mutex::new(HashMap::new()),
        }
    }

    /// Runs one reconciliation pass for the Workflow and persists its
    /// status, failure conditions included. A conflicting status write
    /// aborts the pass; the next tick re-reads fresh state.
    pub async fn reconcile(&self, workflow: &Workflow) -> Result<JobAdvance, ControllerError> {
        let mut workflow = workflow.clone();
        let outcome = self.run_boot_jobs(&mut workflow).await;

        self.store.update_workflow_status(&workflow).await?;
        outcome
    }

    async fn run_boot_jobs(&self, workflow: &mut Workflow) -> Result<JobAdvance, ControllerError> {
        let boot_mode = workflow.spec.boot_options.as_ref().and_then(|b| b.boot_mode);
        match boot_mode {
            Some(BootMode::Netboot) => {
                self.advance(workflow, JobName::Netboot, netboot_actions())
                    .await
            }
            Some(BootMode::Iso) => {
                let iso_url = workflow
                    .spec
                    .boot_options
                    .as_ref()
                    .and_then(|b| b.iso_url.clone())
                    .ok_or_else(|| {
                        ControllerError::InvalidConfig(
                            "iso boot mode requires an isoURL".to_string(),
                        )
                    })?;
                // Any previously mounted image must be ejected before the
                // new one is inserted.
                match self
                    .advance(workflow, JobName::IsoEject, iso_eject_actions())
                    .await?
                {
                    JobAdvance::Requeue => Ok(JobAdvance::Requeue),
                    JobAdvance::Done => {
                        self.advance(workflow, JobName::IsoMount, iso_mount_actions(&iso_url))
                            .await
                    }
                }
            }
            None => Ok(JobAdvance::Done),
        }
    }

    fn backoff_key(namespace: &str, workflow: &str, name: JobName) -> String {
        format!("{namespace}/{workflow}/{name}")
    }

    pub(crate) fn reset_poll_backoff(&self, namespace: &str, workflow: &str, name: JobName) {
        let key = Self::backoff_key(namespace, workflow, name);
        self.poll_backoff.lock().unwrap().remove(&key);
    }

    pub(crate) fn next_poll_delay(&self, namespace: &str, workflow: &str, name: JobName) -> Duration {
        let key = Self::backoff_key(namespace, workflow, name);
        let mut backoffs = self.poll_backoff.lock().unwrap();
        backoffs
            .entry(key)
            .or_insert_with(|| ExponentialBackoff::new(self.poll_initial, self.poll_max))
            .next_backoff()
    }
}

/// Power cycle into a PXE netboot
pub fn netboot_actions() -> Vec<Action> {
    vec![
        Action::power_off(),
        Action::one_time_boot(BootDevice::Pxe, true),
        Action::power_on(),
    ]
}

/// Power cycle into an ISO mounted over virtual media
pub fn iso_mount_actions(iso_url: &str) -> Vec<Action> {
    vec![
        Action::power_off(),
        Action::virtual_media_eject(),
        Action::virtual_media_insert(iso_url.to_string()),
        Action::one_time_boot(BootDevice::Cdrom, true),
        Action::power_on(),
    ]
}

/// Eject any previously mounted virtual media
pub fn iso_eject_actions() -> Vec<Action> {
    vec![Action::virtual_media_eject()]
}
