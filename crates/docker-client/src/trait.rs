//! Docker client trait for mocking
//!
//! This trait abstracts the Docker Engine API client so the worker's
//! container manager can be unit tested against a mock engine.

use crate::error::DockerError;
use crate::models::{ContainerConfig, ImageInspect, RegistryConnDetails};
use futures::stream::BoxStream;

/// Stream of pull progress lines.
///
/// Each item is one newline-delimited record from the engine's pull stream.
/// A transport failure mid-stream (including cancellation of the request)
/// surfaces as an `Err` item, distinct from a record carrying an embedded
/// error message.
pub type PullStream = BoxStream<'static, Result<String, DockerError>>;

/// Trait for Docker Engine API operations
#[async_trait::async_trait]
pub trait DockerClientTrait: Send + Sync {
    /// Start pulling an image; returns the engine's progress stream
    async fn pull(
        &self,
        image: &str,
        auth: Option<&RegistryConnDetails>,
    ) -> Result<PullStream, DockerError>;

    /// Inspect an image in the local store; an error means it is not present
    async fn inspect_image(&self, image: &str) -> Result<ImageInspect, DockerError>;

    /// Create a container, returning its ID
    async fn create_container(
        &self,
        name: &str,
        config: &ContainerConfig,
    ) -> Result<String, DockerError>;

    /// Start a created container
    async fn start_container(&self, id: &str) -> Result<(), DockerError>;

    /// Block until the container exits, returning its exit code
    async fn wait_container(&self, id: &str) -> Result<i64, DockerError>;

    /// Remove a container
    async fn remove_container(&self, id: &str, force: bool) -> Result<(), DockerError>;
}
