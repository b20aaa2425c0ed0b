//! Hardware CRD
//!
//! The machine inventory record. Read-only input to the workflow controller;
//! a Hardware without a BMC reference cannot run boot-automation jobs.

use crate::references::BmcRef;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "metalops.io",
    version = "v1alpha1",
    kind = "Hardware",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSpec {
    /// Reference to the BMC machine resource controlling this hardware
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmc_ref: Option<BmcRef>,

    /// Network interfaces of the machine
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    /// MAC address of the interface
    pub mac: String,

    /// Hostname to hand out over DHCP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}
