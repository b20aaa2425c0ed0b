//! Boot-automation job lifecycle.
//!
//! Drives one named BmcJob through three phases: clean up any pre-existing
//! job under the same name, create (or adopt) a new job, then track it to
//! completion. Progress is recorded in the owning Workflow's status after
//! every side effect, so an interrupted pass resumes exactly where it left
//! off. The three job names share this one state machine, parameterized by
//! name and action list.

use crate::error::ControllerError;
use crate::reconciler::{JobAdvance, Reconciler};
use crds::{
    Action, BmcJob, BmcJobSpec, ConditionStatus, JobConditionType, JobStatus, MachineRef, Workflow,
    WorkflowCondition, WorkflowConditionType, WorkflowStatus,
};
use kube::api::{DeleteParams, ObjectMeta};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Label/annotation marking jobs this controller owns
pub const AUTO_CREATED_KEY: &str = "metalops.io/auto-created";

/// Names of the boot-automation jobs, derived from their purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobName {
    /// PXE netboot the machine
    Netboot,

    /// Mount the installation ISO over virtual media and boot from it
    IsoMount,

    /// Eject mounted virtual media
    IsoEject,
}

impl JobName {
    /// The BmcJob name this job is created under
    pub fn as_str(self) -> &'static str {
        match self {
            JobName::Netboot => "netboot",
            JobName::IsoMount => "iso-mount",
            JobName::IsoEject => "iso-eject",
        }
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase of an automation job, derived from its recorded status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// A pre-existing job of this name must be removed first
    Cleanup,

    /// No job identity is recorded; the job must be created or adopted
    Create,

    /// The job exists and has not reported completion yet
    Track,

    /// The job completed; nothing left to do this cycle
    Done,
}

impl JobPhase {
    /// Derive the phase from the status fields. The phase is never stored,
    /// so status and phase cannot disagree after a crash or restart.
    pub fn of(status: &JobStatus) -> Self {
        if !status.existing_job_deleted {
            JobPhase::Cleanup
        } else if status.uid.is_empty() {
            JobPhase::Create
        } else if !status.complete {
            JobPhase::Track
        } else {
            JobPhase::Done
        }
    }
}

enum Tracked {
    Complete,
    Running,
}

fn status_mut(workflow: &mut Workflow) -> &mut WorkflowStatus {
    workflow.status.get_or_insert_with(WorkflowStatus::default)
}

fn workflow_key(workflow: &Workflow) -> Result<(String, String), ControllerError> {
    let name = workflow
        .metadata
        .name
        .clone()
        .ok_or_else(|| ControllerError::InvalidConfig("Workflow missing name".to_string()))?;
    let namespace = workflow
        .metadata
        .namespace
        .clone()
        .unwrap_or_else(|| "default".to_string());
    Ok((namespace, name))
}

fn auto_created_meta() -> BTreeMap<String, String> {
    BTreeMap::from([(AUTO_CREATED_KEY.to_string(), "true".to_string())])
}

impl Reconciler {
    /// Advance the named automation job by at most one side-effecting
    /// operation, mutating the Workflow status in place. The caller
    /// persists the status and schedules the next pass. Safe to call
    /// repeatedly: a pass with no external change only re-derives the same
    /// phase and re-issues the same idempotent operation.
    pub async fn advance(
        &self,
        workflow: &mut Workflow,
        name: JobName,
        actions: Vec<Action>,
    ) -> Result<JobAdvance, ControllerError> {
        let current = workflow
            .status
            .as_ref()
            .map(|s| s.job(name.as_str()))
            .unwrap_or_default();

        match JobPhase::of(&current) {
            JobPhase::Cleanup => self.delete_existing(workflow, name).await,
            JobPhase::Create => self.create_job(workflow, name, actions).await,
            JobPhase::Track => self.track_job(workflow, name).await,
            JobPhase::Done => Ok(JobAdvance::Done),
        }
    }

    async fn delete_existing(
        &self,
        workflow: &mut Workflow,
        name: JobName,
    ) -> Result<JobAdvance, ControllerError> {
        let (namespace, wf_name) = workflow_key(workflow)?;
        debug!("Deleting existing job {} for workflow {}/{}", name, namespace, wf_name);

        // Immediate, cascading removal: a stale job must be fully gone
        // before a new one can reuse the name.
        let params = DeleteParams::foreground().grace_period(0);
        self.store
            .delete_job(&namespace, name.as_str(), &params)
            .await
            .map_err(|e| ControllerError::JobDelete {
                name: name.to_string(),
                source: e,
            })?;

        let status = status_mut(workflow);
        let mut job = status.job(name.as_str());
        job.existing_job_deleted = true;
        // The deletion invalidates any identity recorded for the old job
        job.uid = String::new();
        job.complete = false;
        status.set_job(name.as_str(), job);

        self.reset_poll_backoff(&namespace, &wf_name, name);
        Ok(JobAdvance::Requeue)
    }

    async fn create_job(
        &self,
        workflow: &mut Workflow,
        name: JobName,
        actions: Vec<Action>,
    ) -> Result<JobAdvance, ControllerError> {
        let (namespace, wf_name) = workflow_key(workflow)?;
        self.reset_poll_backoff(&namespace, &wf_name, name);

        match self.ensure_job(workflow, name, actions).await {
            Ok(advance) => {
                status_mut(workflow).set_condition(WorkflowCondition::new(
                    WorkflowConditionType::SetupComplete,
                    ConditionStatus::True,
                    "Created",
                    "job created".to_string(),
                ));
                Ok(advance)
            }
            Err(e) => {
                status_mut(workflow).set_condition(WorkflowCondition::new(
                    WorkflowConditionType::SetupFailed,
                    ConditionStatus::True,
                    "Error",
                    format!("error creating job: {e}"),
                ));
                Err(e)
            }
        }
    }

    async fn ensure_job(
        &self,
        workflow: &mut Workflow,
        name: JobName,
        actions: Vec<Action>,
    ) -> Result<JobAdvance, ControllerError> {
        let (namespace, _) = workflow_key(workflow)?;

        if let Some(existing) = self
            .store
            .get_job(&namespace, name.as_str())
            .await
            .map_err(|e| ControllerError::JobGet {
                name: name.to_string(),
                source: e,
            })?
        {
            debug!("Job {} already exists", name);
            if existing.metadata.deletion_timestamp.is_some() {
                // A previous incarnation is still going away; recreating
                // now would race its cascading delete.
                debug!("Job {} is being deleted, waiting", name);
                return Ok(JobAdvance::Requeue);
            }

            // Adopt the identity: a prior pass may have created the job
            // and lost the status write.
            let status = status_mut(workflow);
            let mut job_status = status.job(name.as_str());
            job_status.uid = existing.metadata.uid.clone().unwrap_or_default();
            status.set_job(name.as_str(), job_status);
            return Ok(JobAdvance::Requeue);
        }

        let hardware = self
            .store
            .get_hardware(&namespace, &workflow.spec.hardware_ref)
            .await
            .map_err(|e| ControllerError::HardwareGet {
                name: workflow.spec.hardware_ref.clone(),
                source: e,
            })?
            .ok_or_else(|| ControllerError::HardwareNotFound(workflow.spec.hardware_ref.clone()))?;
        let bmc_ref = hardware
            .spec
            .bmc_ref
            .as_ref()
            .ok_or_else(|| ControllerError::MissingBmc(workflow.spec.hardware_ref.clone()))?;

        let job = BmcJob {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.clone()),
                labels: Some(auto_created_meta()),
                annotations: Some(auto_created_meta()),
                ..Default::default()
            },
            spec: BmcJobSpec {
                machine_ref: MachineRef {
                    name: bmc_ref.name.clone(),
                    namespace: namespace.clone(),
                },
                tasks: actions,
            },
            status: None,
        };
        let created = self
            .store
            .create_job(&job)
            .await
            .map_err(|e| ControllerError::JobCreate {
                name: name.to_string(),
                source: e,
            })?;
        debug!("Job {} created", name);

        let status = status_mut(workflow);
        let mut job_status = status.job(name.as_str());
        job_status.uid = created.metadata.uid.unwrap_or_default();
        status.set_job(name.as_str(), job_status);
        Ok(JobAdvance::Requeue)
    }

    async fn track_job(
        &self,
        workflow: &mut Workflow,
        name: JobName,
    ) -> Result<JobAdvance, ControllerError> {
        debug!("Tracking job {}", name);

        match self.poll_job(workflow, name).await {
            Ok(Tracked::Complete) => {
                status_mut(workflow).set_condition(WorkflowCondition::new(
                    WorkflowConditionType::JobComplete,
                    ConditionStatus::True,
                    "Complete",
                    "job completed".to_string(),
                ));
                Ok(JobAdvance::Requeue)
            }
            Ok(Tracked::Running) => Ok(JobAdvance::Requeue),
            Err(e) => {
                status_mut(workflow).set_condition(WorkflowCondition::new(
                    WorkflowConditionType::JobFailed,
                    ConditionStatus::True,
                    "Error",
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    async fn poll_job(
        &self,
        workflow: &mut Workflow,
        name: JobName,
    ) -> Result<Tracked, ControllerError> {
        let (namespace, wf_name) = workflow_key(workflow)?;

        let job = self
            .store
            .get_job(&namespace, name.as_str())
            .await
            .map_err(|e| ControllerError::JobGet {
                name: name.to_string(),
                source: e,
            })?
            // A recorded UID means the job existed; its absence now is a
            // real failure, not "still starting".
            .ok_or_else(|| ControllerError::JobDisappeared(name.to_string()))?;

        if job.has_condition(JobConditionType::Failed, ConditionStatus::True) {
            debug!("Job {} failed", name);
            return Err(ControllerError::JobFailed(name.to_string()));
        }
        if job.has_condition(JobConditionType::Completed, ConditionStatus::True) {
            debug!("Job {} completed", name);
            let status = status_mut(workflow);
            let mut job_status = status.job(name.as_str());
            job_status.complete = true;
            status.set_job(name.as_str(), job_status);
            return Ok(Tracked::Complete);
        }

        debug!("Job {} still running", name);
        // Bounded, cancellable pause; dropping the pass cancels the wait
        let delay = self.next_poll_delay(&namespace, &wf_name, name);
        tokio::time::sleep(delay).await;
        Ok(Tracked::Running)
    }
}
