//! Workflow CRD
//!
//! The aggregate tracking a machine's provisioning run. The status carries
//! one JobStatus record per boot-automation job name plus the condition log
//! of lifecycle events.

use crate::condition::WorkflowCondition;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "metalops.io",
    version = "v1alpha1",
    kind = "Workflow",
    namespaced,
    status = "WorkflowStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    /// Name of the Hardware this workflow provisions (same namespace)
    pub hardware_ref: String,

    /// Out-of-band boot configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_options: Option<BootOptions>,
}

/// How the machine should be booted into the provisioning environment
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BootOptions {
    /// Boot mechanism to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_mode: Option<BootMode>,

    /// URL of the installation ISO, required for `iso` boot mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum BootMode {
    /// PXE netboot into the in-band provisioning agent
    Netboot,

    /// Boot from a virtual-media mounted ISO
    Iso,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    /// Per-job progress for out-of-band boot automation
    #[serde(default)]
    pub boot_options: BootOptionsStatus,

    /// Timestamped lifecycle events, latest write per type wins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<WorkflowCondition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BootOptionsStatus {
    /// Keyed by automation job name (e.g. "netboot")
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub jobs: HashMap<String, JobStatus>,
}

/// Durable progress of one boot-automation job through its lifecycle.
///
/// The lifecycle phase is derived from these fields, never stored: an entry
/// with `existing_job_deleted` unset is still in cleanup, an empty `uid`
/// means the BmcJob has not been created (or adopted) yet, and `complete`
/// is only set once the BmcJob reported successful completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    /// UID of the BmcJob once created; empty means not yet created
    #[serde(default)]
    pub uid: String,

    /// True once any pre-existing job of this name was removed this cycle
    #[serde(default)]
    pub existing_job_deleted: bool,

    /// True once the BmcJob reported successful completion
    #[serde(default)]
    pub complete: bool,
}

impl WorkflowStatus {
    /// Record a condition, overwriting any earlier record of the same type
    pub fn set_condition(&mut self, condition: WorkflowCondition) {
        if let Some(existing) = self
            .conditions
            .iter_mut()
            .find(|c| c.condition_type == condition.condition_type)
        {
            *existing = condition;
        } else {
            self.conditions.push(condition);
        }
    }

    /// Status of the named automation job, zero-valued if never addressed
    pub fn job(&self, name: &str) -> JobStatus {
        self.boot_options.jobs.get(name).cloned().unwrap_or_default()
    }

    /// Write back the status of the named automation job
    pub fn set_job(&mut self, name: &str, status: JobStatus) {
        self.boot_options.jobs.insert(name.to_string(), status);
    }
}
