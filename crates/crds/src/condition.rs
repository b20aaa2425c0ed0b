//! Lifecycle conditions for Workflow and BmcJob resources
//!
//! Conditions are timestamped, type-keyed status records. The latest write
//! per type wins, so a condition list is an append/overwrite log of
//! lifecycle events.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kubernetes-style condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionStatus {
    /// The condition holds
    True,

    /// The condition does not hold
    False,
}

/// Condition types recorded on a Workflow for its boot-automation jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum WorkflowConditionType {
    /// The automation job was created successfully
    SetupComplete,

    /// Creating the automation job failed
    SetupFailed,

    /// The automation job reported failure
    JobFailed,

    /// The automation job reported successful completion
    JobComplete,
}

/// A timestamped lifecycle event on a Workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowCondition {
    /// Condition type; only the latest record per type is kept
    #[serde(rename = "type")]
    pub condition_type: WorkflowConditionType,

    /// Whether the condition holds
    pub status: ConditionStatus,

    /// Machine-readable reason (e.g. "Created", "Error")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// When the condition was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl WorkflowCondition {
    /// Create a condition stamped with the current time
    pub fn new(
        condition_type: WorkflowConditionType,
        status: ConditionStatus,
        reason: &str,
        message: String,
    ) -> Self {
        Self {
            condition_type,
            status,
            reason: Some(reason.to_string()),
            message: Some(message),
            time: Some(Utc::now()),
        }
    }
}

/// Condition types reported on a BmcJob by its executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum JobConditionType {
    /// The job failed
    Failed,

    /// The job completed successfully
    Completed,
}

/// A condition on a BmcJob, written by the out-of-band job executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCondition {
    /// Condition type
    #[serde(rename = "type")]
    pub condition_type: JobConditionType,

    /// Whether the condition holds
    pub status: ConditionStatus,

    /// Human-readable detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
