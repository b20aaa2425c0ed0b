//! Workflow Controller
//!
//! Drives the out-of-band hardware actions (netboot, ISO mount, ISO eject)
//! needed to provision a physical machine. Each Workflow's boot-automation
//! jobs are BmcJob resources lifecycle-managed through an idempotent
//! cleanup/create/track state machine, with durable progress recorded in
//! the Workflow status.

mod backoff;
mod controller;
mod error;
mod reconciler;
#[cfg(test)]
mod test_utils;

use crate::error::ControllerError;
use controller::Controller;
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    info!("Starting Workflow Controller");

    // Load configuration from environment variables
    let namespace = env::var("WATCH_NAMESPACE").ok();

    info!("Configuration:");
    info!(
        "  Namespace: {}",
        namespace.as_deref().unwrap_or("default")
    );

    // Initialize and run controller
    let controller = Controller::new(namespace).await?;
    controller.run().await
}
