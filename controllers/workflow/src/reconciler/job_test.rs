//! Unit tests for the boot-automation job lifecycle

use super::job::{JobName, JobPhase};
use super::{netboot_actions, JobAdvance, Reconciler};
use crate::error::ControllerError;
use crate::test_utils::*;
use crds::{
    BmcJobStatus, BootMode, ConditionStatus, JobCondition, JobConditionType, JobStatus, Workflow,
    WorkflowConditionType,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use machine_store::MockMachineStore;
use std::sync::Arc;
use std::time::Duration;

fn test_reconciler(store: &MockMachineStore) -> Reconciler {
    Reconciler::with_poll_interval(
        Arc::new(store.clone()),
        Duration::from_millis(1),
        Duration::from_millis(8),
    )
}

fn has_condition(workflow: &Workflow, condition_type: WorkflowConditionType) -> bool {
    workflow
        .status
        .as_ref()
        .map(|s| {
            s.conditions
                .iter()
                .any(|c| c.condition_type == condition_type)
        })
        .unwrap_or(false)
}

fn assert_no_premature_completion(status: &JobStatus) {
    if status.complete {
        assert!(!status.uid.is_empty());
        assert!(status.existing_job_deleted);
    }
}

#[test]
fn test_phase_is_derived_from_status_fields() {
    assert_eq!(JobPhase::of(&JobStatus::default()), JobPhase::Cleanup);
    assert_eq!(
        JobPhase::of(&JobStatus {
            existing_job_deleted: true,
            ..Default::default()
        }),
        JobPhase::Create
    );
    assert_eq!(
        JobPhase::of(&JobStatus {
            uid: "abc".to_string(),
            existing_job_deleted: true,
            complete: false,
        }),
        JobPhase::Track
    );
    assert_eq!(
        JobPhase::of(&JobStatus {
            uid: "abc".to_string(),
            existing_job_deleted: true,
            complete: true,
        }),
        JobPhase::Done
    );
}

#[tokio::test]
async fn test_cleanup_deletes_existing_job_and_requeues() {
    let store = MockMachineStore::new();
    store.add_job(create_test_job("netboot", "stale-uid"));
    let reconciler = test_reconciler(&store);
    let mut wf = create_test_workflow("wf", Some(BootMode::Netboot));

    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();

    assert_eq!(outcome, JobAdvance::Requeue);
    assert!(store.job("default", "netboot").is_none());
    assert_eq!(store.jobs_deleted(), 1);

    let job = wf.status.unwrap().job("netboot");
    assert_eq!(
        job,
        JobStatus {
            uid: String::new(),
            existing_job_deleted: true,
            complete: false,
        }
    );
}

#[tokio::test]
async fn test_cleanup_is_idempotent_without_existing_job() {
    let store = MockMachineStore::new();
    let reconciler = test_reconciler(&store);
    let mut wf = create_test_workflow("wf", Some(BootMode::Netboot));

    reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();
    let first = wf.status.as_ref().unwrap().job("netboot");

    // Re-enter the cleanup phase, as if the lifecycle was re-triggered
    wf = with_job_status(wf, "netboot", JobStatus::default());
    reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();
    let second = wf.status.as_ref().unwrap().job("netboot");

    assert_eq!(first, second);
    assert_eq!(store.delete_job_calls(), 2);
    // No job was ever present, so nothing was actually removed
    assert_eq!(store.jobs_deleted(), 0);
}

#[tokio::test]
async fn test_cleanup_clears_recorded_identity() {
    let store = MockMachineStore::new();
    let reconciler = test_reconciler(&store);
    // A re-trigger lands with a stale uid and completion from the last cycle
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            uid: "old-uid".to_string(),
            existing_job_deleted: false,
            complete: true,
        },
    );

    reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();

    let job = wf.status.unwrap().job("netboot");
    assert_eq!(job.uid, "");
    assert!(job.existing_job_deleted);
    assert!(!job.complete);
}

#[tokio::test]
async fn test_create_adopts_existing_job_uid() {
    let store = MockMachineStore::new();
    store.add_job(create_test_job("netboot", "abc-123"));
    let reconciler = test_reconciler(&store);
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            existing_job_deleted: true,
            ..Default::default()
        },
    );

    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();

    assert_eq!(outcome, JobAdvance::Requeue);
    // Adopted, not recreated
    assert_eq!(store.create_job_calls(), 0);
    assert_eq!(wf.status.as_ref().unwrap().job("netboot").uid, "abc-123");
    assert!(has_condition(&wf, WorkflowConditionType::SetupComplete));
}

#[tokio::test]
async fn test_create_waits_while_job_is_being_deleted() {
    let store = MockMachineStore::new();
    let mut stale = create_test_job("netboot", "abc-123");
    stale.metadata.deletion_timestamp = Some(Time(chrono::Utc::now()));
    store.add_job(stale);
    let reconciler = test_reconciler(&store);
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            existing_job_deleted: true,
            ..Default::default()
        },
    );

    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();

    assert_eq!(outcome, JobAdvance::Requeue);
    // No identity is adopted from a job on its way out
    assert_eq!(wf.status.as_ref().unwrap().job("netboot").uid, "");
    assert_eq!(store.create_job_calls(), 0);
}

#[tokio::test]
async fn test_create_builds_job_from_hardware() {
    let store = MockMachineStore::new();
    store.add_hardware(create_test_hardware(true));
    let reconciler = test_reconciler(&store);
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            existing_job_deleted: true,
            ..Default::default()
        },
    );

    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();

    assert_eq!(outcome, JobAdvance::Requeue);
    assert_eq!(store.create_job_calls(), 1);

    let created = store.job("default", "netboot").unwrap();
    assert_eq!(created.spec.machine_ref.name, "bmc-machine-0");
    assert_eq!(created.spec.tasks, netboot_actions());
    assert_eq!(
        created
            .metadata
            .labels
            .as_ref()
            .and_then(|l| l.get("metalops.io/auto-created"))
            .map(String::as_str),
        Some("true")
    );

    // The created job's identity is recorded for the tracking phase
    assert!(!wf.status.as_ref().unwrap().job("netboot").uid.is_empty());
    assert!(has_condition(&wf, WorkflowConditionType::SetupComplete));
}

#[tokio::test]
async fn test_create_fails_permanently_without_bmc() {
    let store = MockMachineStore::new();
    store.add_hardware(create_test_hardware(false));
    let reconciler = test_reconciler(&store);
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            existing_job_deleted: true,
            ..Default::default()
        },
    );

    let err = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::MissingBmc(_)));
    assert_eq!(store.create_job_calls(), 0);
    assert!(has_condition(&wf, WorkflowConditionType::SetupFailed));

    let message = wf
        .status
        .as_ref()
        .unwrap()
        .conditions
        .iter()
        .find(|c| c.condition_type == WorkflowConditionType::SetupFailed)
        .and_then(|c| c.message.clone())
        .unwrap();
    assert!(message.starts_with("error creating job:"));
    assert_eq!(wf.status.as_ref().unwrap().job("netboot").uid, "");
}

#[tokio::test]
async fn test_create_fails_when_hardware_is_missing() {
    let store = MockMachineStore::new();
    let reconciler = test_reconciler(&store);
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            existing_job_deleted: true,
            ..Default::default()
        },
    );

    let err = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::HardwareNotFound(_)));
    assert!(has_condition(&wf, WorkflowConditionType::SetupFailed));
}

#[tokio::test]
async fn test_track_sets_complete_on_completed_condition() {
    let store = MockMachineStore::new();
    store.add_job(job_with_condition(
        "netboot",
        "abc-123",
        JobConditionType::Completed,
        ConditionStatus::True,
    ));
    let reconciler = test_reconciler(&store);
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            uid: "abc-123".to_string(),
            existing_job_deleted: true,
            complete: false,
        },
    );

    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();

    assert_eq!(outcome, JobAdvance::Requeue);
    assert!(wf.status.as_ref().unwrap().job("netboot").complete);
    assert!(has_condition(&wf, WorkflowConditionType::JobComplete));
}

#[tokio::test]
async fn test_track_reports_failed_condition_as_error() {
    let store = MockMachineStore::new();
    store.add_job(job_with_condition(
        "netboot",
        "abc-123",
        JobConditionType::Failed,
        ConditionStatus::True,
    ));
    let reconciler = test_reconciler(&store);
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            uid: "abc-123".to_string(),
            existing_job_deleted: true,
            complete: false,
        },
    );

    let err = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::JobFailed(_)));
    assert!(has_condition(&wf, WorkflowConditionType::JobFailed));
    // A failed job is never marked complete
    assert!(!wf.status.as_ref().unwrap().job("netboot").complete);
}

#[tokio::test]
async fn test_track_errors_when_tracked_job_disappears() {
    let store = MockMachineStore::new();
    let reconciler = test_reconciler(&store);
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            uid: "abc-123".to_string(),
            existing_job_deleted: true,
            complete: false,
        },
    );

    let err = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::JobDisappeared(_)));
    assert!(err.to_string().starts_with("error getting job"));
    assert!(has_condition(&wf, WorkflowConditionType::JobFailed));
}

#[tokio::test]
async fn test_track_requeues_while_job_is_running() {
    let store = MockMachineStore::new();
    store.add_job(create_test_job("netboot", "abc-123"));
    let reconciler = test_reconciler(&store);
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            uid: "abc-123".to_string(),
            existing_job_deleted: true,
            complete: false,
        },
    );

    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();

    assert_eq!(outcome, JobAdvance::Requeue);
    assert!(!wf.status.as_ref().unwrap().job("netboot").complete);
}

#[tokio::test]
async fn test_done_phase_takes_no_action() {
    let store = MockMachineStore::new();
    let reconciler = test_reconciler(&store);
    let mut wf = with_job_status(
        create_test_workflow("wf", Some(BootMode::Netboot)),
        "netboot",
        JobStatus {
            uid: "abc-123".to_string(),
            existing_job_deleted: true,
            complete: true,
        },
    );

    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();

    assert_eq!(outcome, JobAdvance::Done);
    assert_eq!(store.create_job_calls(), 0);
    assert_eq!(store.delete_job_calls(), 0);
}

#[tokio::test]
async fn test_full_job_lifecycle() {
    let store = MockMachineStore::new();
    store.add_hardware(create_test_hardware(true));
    let reconciler = test_reconciler(&store);
    let mut wf = create_test_workflow("wf", Some(BootMode::Netboot));

    // Cleanup
    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();
    assert_eq!(outcome, JobAdvance::Requeue);
    assert_no_premature_completion(&wf.status.as_ref().unwrap().job("netboot"));

    // Create
    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();
    assert_eq!(outcome, JobAdvance::Requeue);
    let after_create = wf.status.as_ref().unwrap().job("netboot");
    assert!(!after_create.uid.is_empty());
    assert_no_premature_completion(&after_create);

    // The external executor finishes the job between passes
    let mut job = store.job("default", "netboot").unwrap();
    job.status = Some(BmcJobStatus {
        conditions: vec![JobCondition {
            condition_type: JobConditionType::Completed,
            status: ConditionStatus::True,
            message: None,
        }],
    });
    store.add_job(job);

    // Track
    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();
    assert_eq!(outcome, JobAdvance::Requeue);

    // Done
    let outcome = reconciler
        .advance(&mut wf, JobName::Netboot, netboot_actions())
        .await
        .unwrap();
    assert_eq!(outcome, JobAdvance::Done);

    let final_status = wf.status.as_ref().unwrap().job("netboot");
    assert!(!final_status.uid.is_empty());
    assert!(final_status.existing_job_deleted);
    assert!(final_status.complete);
    assert!(has_condition(&wf, WorkflowConditionType::SetupComplete));
    assert!(has_condition(&wf, WorkflowConditionType::JobComplete));
}
