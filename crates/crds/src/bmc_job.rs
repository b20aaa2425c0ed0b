//! BmcJob CRD
//!
//! A BMC-directed sequence of power and boot actions, created and deleted by
//! the workflow controller and executed by the out-of-band job executor. A
//! BmcJob is never mutated in place; a changed task list means
//! delete-then-recreate under the same name.

use crate::condition::{ConditionStatus, JobCondition, JobConditionType};
use crate::references::MachineRef;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "metalops.io",
    version = "v1alpha1",
    kind = "BmcJob",
    namespaced,
    status = "BmcJobStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct BmcJobSpec {
    /// The BMC machine the tasks are directed at
    pub machine_ref: MachineRef,

    /// Ordered task list; executed front to back
    pub tasks: Vec<Action>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BmcJobStatus {
    /// Conditions written by the job executor; read-only to the controller
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<JobCondition>,
}

impl BmcJob {
    /// True when the job carries the given condition with the given status
    pub fn has_condition(&self, condition_type: JobConditionType, status: ConditionStatus) -> bool {
        self.status
            .as_ref()
            .map(|s| {
                s.conditions
                    .iter()
                    .any(|c| c.condition_type == condition_type && c.status == status)
            })
            .unwrap_or(false)
    }
}

/// One step in an automation job. Exactly one of the fields is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Power the machine on or off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_action: Option<PowerAction>,

    /// Set the boot device for the next boot only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time_boot_device_action: Option<OneTimeBootDeviceAction>,

    /// Insert or eject virtual media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_media_action: Option<VirtualMediaAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    On,
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeBootDeviceAction {
    /// Candidate boot devices, in preference order
    pub devices: Vec<BootDevice>,

    /// Request an EFI boot entry
    #[serde(default)]
    pub efi_boot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BootDevice {
    Pxe,
    Cdrom,
    Disk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMediaAction {
    /// Media image URL; absent means eject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    /// Virtual media slot
    pub kind: VirtualMediaKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VirtualMediaKind {
    Cd,
}

impl Action {
    /// Power the machine on
    pub fn power_on() -> Self {
        Self {
            power_action: Some(PowerAction::On),
            ..Default::default()
        }
    }

    /// Power the machine off
    pub fn power_off() -> Self {
        Self {
            power_action: Some(PowerAction::Off),
            ..Default::default()
        }
    }

    /// Set the boot device for the next boot only
    pub fn one_time_boot(device: BootDevice, efi_boot: bool) -> Self {
        Self {
            one_time_boot_device_action: Some(OneTimeBootDeviceAction {
                devices: vec![device],
                efi_boot,
            }),
            ..Default::default()
        }
    }

    /// Insert virtual media from the given URL
    pub fn virtual_media_insert(media_url: String) -> Self {
        Self {
            virtual_media_action: Some(VirtualMediaAction {
                media_url: Some(media_url),
                kind: VirtualMediaKind::Cd,
            }),
            ..Default::default()
        }
    }

    /// Eject any mounted virtual media
    pub fn virtual_media_eject() -> Self {
        Self {
            virtual_media_action: Some(VirtualMediaAction {
                media_url: None,
                kind: VirtualMediaKind::Cd,
            }),
            ..Default::default()
        }
    }
}
