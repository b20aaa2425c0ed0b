//! Metalops CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the metalops controllers:
//! - Workflow: tracks a machine's provisioning run and its boot-automation jobs
//! - BmcJob: a BMC-directed sequence of power/boot actions
//! - Hardware: the machine inventory record, including its BMC reference

pub mod bmc_job;
pub mod condition;
pub mod hardware;
pub mod references;
pub mod workflow;

pub use bmc_job::*;
pub use condition::*;
pub use hardware::*;
pub use references::*;
pub use workflow::*;
