//! Object references between metalops resources
//!
//! Follows the Kubernetes local object reference pattern: name plus an
//! optional namespace, defaulting to the namespace of the referencing
//! resource.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference from a BmcJob to the BMC machine it drives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineRef {
    /// Name of the BMC machine resource
    pub name: String,

    /// Namespace of the BMC machine resource
    pub namespace: String,
}

/// Reference from a Hardware record to its BMC machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BmcRef {
    /// Name of the BMC machine resource (same namespace as the Hardware)
    pub name: String,
}
