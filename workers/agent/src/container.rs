//! Container pull and execution manager.
//!
//! Turns one workflow action into a running container. Image pulls tolerate
//! registry unavailability when the image is already in the local store: a
//! provisioning agent cannot assume reliable registry access on every run,
//! and the common case is that the action's image was pulled by an earlier
//! step or run.

use crate::error::WorkerError;
use docker_client::{
    ContainerConfig, DockerClientTrait, DockerError, PullProgress, RegistryConnDetails,
};
use futures::StreamExt;
use tracing::{debug, info};

/// Manages action containers on the local engine.
pub struct ContainerManager<C> {
    client: C,
    registry: Option<RegistryConnDetails>,
}

impl<C> std::fmt::Debug for ContainerManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerManager").finish_non_exhaustive()
    }
}

impl<C: DockerClientTrait> ContainerManager<C> {
    /// Creates a manager over the given engine client. Absent registry
    /// credentials mean anonymous pulls.
    pub fn new(client: C, registry: Option<RegistryConnDetails>) -> Self {
        Self { client, registry }
    }

    /// Pull an image into the local store.
    ///
    /// A pull failure is provisional: if the image is already present
    /// locally, the failure is immaterial and the pull succeeds. Only when
    /// the image is absent does the failure surface, wrapped with the
    /// original engine or transport message.
    pub async fn pull_image(&self, image: &str) -> Result<(), DockerError> {
        debug!("Pulling image {}", image);

        let mut stream = match self.client.pull(image, self.registry.as_ref()).await {
            Ok(stream) => stream,
            Err(e) => return self.fallback_to_local(image, e.detail()).await,
        };

        while let Some(line) = stream.next().await {
            let line = match line {
                Ok(line) => line,
                // Transport failure mid-stream, including cancellation; a
                // broken pull is never a clean completion
                Err(e) => return self.fallback_to_local(image, e.detail()).await,
            };
            // Malformed lines are not fatal by themselves
            let Ok(progress) = serde_json::from_str::<PullProgress>(&line) else {
                continue;
            };
            if let Some(message) = progress.error {
                return self.fallback_to_local(image, message).await;
            }
        }

        debug!("Image {} pulled", image);
        Ok(())
    }

    /// Swallow a pull failure when the image is already cached locally.
    async fn fallback_to_local(&self, image: &str, failure: String) -> Result<(), DockerError> {
        if self.client.inspect_image(image).await.is_ok() {
            debug!("Image {} already present locally, ignoring pull failure", image);
            return Ok(());
        }
        Err(DockerError::Pull(failure))
    }

    /// Run one action to completion: pull its image, then create, start,
    /// wait on, and remove the container.
    pub async fn run_action(
        &self,
        name: &str,
        image: &str,
        cmd: Vec<String>,
    ) -> Result<(), WorkerError> {
        info!("Running action {} ({})", name, image);

        self.pull_image(image).await?;

        let config = ContainerConfig {
            image: image.to_string(),
            cmd,
            env: vec![],
        };
        let id = self.client.create_container(name, &config).await?;
        self.client.start_container(&id).await?;
        let exit_code = self.client.wait_container(&id).await?;
        self.client.remove_container(&id, true).await?;

        if exit_code != 0 {
            return Err(WorkerError::ActionFailed {
                name: name.to_string(),
                exit_code,
            });
        }
        info!("Action {} completed", name);
        Ok(())
    }
}
