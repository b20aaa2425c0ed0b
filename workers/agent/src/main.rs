//! Provisioning Worker
//!
//! The in-band side of a provisioning run: executes one containerized
//! workflow action against the local Docker engine. Image pulls tolerate
//! registry unavailability when the image is already cached locally.

mod container;
mod error;

use crate::container::ContainerManager;
use crate::error::WorkerError;
use docker_client::{DockerClient, RegistryConnDetails};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), WorkerError> {
    tracing_subscriber::fmt::init();

    info!("Starting Provisioning Worker");

    // Load configuration from environment variables
    let docker_host =
        env::var("DOCKER_HOST").unwrap_or_else(|_| "http://localhost:2375".to_string());
    let registry = env::var("REGISTRY").ok().map(|registry| RegistryConnDetails {
        registry,
        username: env::var("REGISTRY_USERNAME").unwrap_or_default(),
        password: env::var("REGISTRY_PASSWORD").unwrap_or_default(),
    });
    let action_name = env::var("ACTION_NAME").unwrap_or_else(|_| "action".to_string());
    let action_image = env::var("ACTION_IMAGE").map_err(|_| {
        WorkerError::InvalidConfig("ACTION_IMAGE environment variable is required".to_string())
    })?;
    let action_cmd: Vec<String> = env::var("ACTION_CMD")
        .map(|cmd| cmd.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    info!("Configuration:");
    info!("  Docker host: {}", docker_host);
    info!(
        "  Registry: {}",
        registry
            .as_ref()
            .map(|r| r.registry.as_str())
            .unwrap_or("anonymous")
    );
    info!("  Action: {} ({})", action_name, action_image);

    let client = DockerClient::new(docker_host)?;
    let manager = ContainerManager::new(client, registry);
    manager.run_action(&action_name, &action_image, action_cmd).await
}
