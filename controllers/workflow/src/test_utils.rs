//! Test utilities for unit testing the reconciler
//!
//! Helpers for creating test resources and seeding job statuses.

use crds::{
    BmcJob, BmcJobSpec, BmcJobStatus, BmcRef, BootMode, BootOptions, ConditionStatus, Hardware,
    HardwareSpec, JobCondition, JobConditionType, JobStatus, MachineRef, NetworkInterface,
    Workflow, WorkflowSpec,
};
use kube::api::ObjectMeta;

/// Helper to create a test Workflow with the given boot mode
pub fn create_test_workflow(name: &str, boot_mode: Option<BootMode>) -> Workflow {
    Workflow {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            resource_version: Some("1".to_string()),
            ..Default::default()
        },
        spec: WorkflowSpec {
            hardware_ref: "machine-0".to_string(),
            boot_options: boot_mode.map(|mode| BootOptions {
                boot_mode: Some(mode),
                iso_url: Some("http://images.local/install.iso".to_string()),
            }),
        },
        status: None,
    }
}

/// Helper to create a test Hardware record, with or without a BMC reference
pub fn create_test_hardware(with_bmc: bool) -> Hardware {
    Hardware {
        metadata: ObjectMeta {
            name: Some("machine-0".to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        spec: HardwareSpec {
            bmc_ref: with_bmc.then(|| BmcRef {
                name: "bmc-machine-0".to_string(),
            }),
            interfaces: vec![NetworkInterface {
                mac: "aa:bb:cc:dd:ee:ff".to_string(),
                hostname: None,
            }],
        },
    }
}

/// Helper to create a test BmcJob with the given UID and no conditions
pub fn create_test_job(name: &str, uid: &str) -> BmcJob {
    BmcJob {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            uid: Some(uid.to_string()),
            ..Default::default()
        },
        spec: BmcJobSpec {
            machine_ref: MachineRef {
                name: "bmc-machine-0".to_string(),
                namespace: "default".to_string(),
            },
            tasks: vec![],
        },
        status: None,
    }
}

/// Helper to create a test BmcJob carrying one executor condition
pub fn job_with_condition(
    name: &str,
    uid: &str,
    condition_type: JobConditionType,
    status: ConditionStatus,
) -> BmcJob {
    let mut job = create_test_job(name, uid);
    job.status = Some(BmcJobStatus {
        conditions: vec![JobCondition {
            condition_type,
            status,
            message: None,
        }],
    });
    job
}

/// Helper to seed a job status entry on a Workflow
pub fn with_job_status(mut workflow: Workflow, name: &str, status: JobStatus) -> Workflow {
    workflow
        .status
        .get_or_insert_with(Default::default)
        .set_job(name, status);
    workflow
}
