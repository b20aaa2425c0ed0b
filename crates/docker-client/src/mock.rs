//! Mock Docker client for unit testing
//!
//! Serves a canned pull stream and lets tests inject transport errors,
//! mid-stream failures, and local-inspect outcomes without a running
//! engine.

use crate::docker_trait::{DockerClientTrait, PullStream};
use crate::error::DockerError;
use crate::models::{ContainerConfig, ImageInspect, RegistryConnDetails};
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock Docker client for testing
#[derive(Clone, Default)]
pub struct MockDockerClient {
    pull_content: Arc<Mutex<String>>,
    pull_err: Arc<Mutex<Option<String>>>,
    stream_err: Arc<Mutex<Option<String>>>,
    inspect_err: Arc<Mutex<Option<String>>>,
    wait_status: Arc<Mutex<i64>>,
    containers: Arc<Mutex<HashMap<String, ContainerConfig>>>,
    pull_calls: Arc<Mutex<u64>>,
    next_id: Arc<Mutex<u64>>,
}

impl std::fmt::Debug for MockDockerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDockerClient").finish_non_exhaustive()
    }
}

impl MockDockerClient {
    /// Create a mock that serves an empty, successful pull stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the given newline-delimited content as the pull stream
    pub fn with_pull_content(self, content: &str) -> Self {
        *self.pull_content.lock().unwrap() = content.to_string();
        self
    }

    /// Fail the pull call itself with the given transport error message
    pub fn with_pull_error(self, message: &str) -> Self {
        *self.pull_err.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Break the pull stream with a transport error after the content
    pub fn with_stream_error(self, message: &str) -> Self {
        *self.stream_err.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Make local image inspection fail (image not in the local store)
    pub fn with_inspect_error(self, message: &str) -> Self {
        *self.inspect_err.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Exit code returned by wait_container (default 0)
    pub fn with_wait_status(self, status: i64) -> Self {
        *self.wait_status.lock().unwrap() = status;
        self
    }

    /// Number of pull calls issued so far
    pub fn pull_calls(&self) -> u64 {
        *self.pull_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl DockerClientTrait for MockDockerClient {
    async fn pull(
        &self,
        _image: &str,
        _auth: Option<&RegistryConnDetails>,
    ) -> Result<PullStream, DockerError> {
        *self.pull_calls.lock().unwrap() += 1;
        if let Some(message) = self.pull_err.lock().unwrap().clone() {
            return Err(DockerError::Api(message));
        }

        let mut items: Vec<Result<String, DockerError>> = self
            .pull_content
            .lock()
            .unwrap()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Ok(line.to_string()))
            .collect();
        if let Some(message) = self.stream_err.lock().unwrap().clone() {
            items.push(Err(DockerError::Api(message)));
        }
        Ok(futures::stream::iter(items).boxed())
    }

    async fn inspect_image(&self, image: &str) -> Result<ImageInspect, DockerError> {
        if let Some(message) = self.inspect_err.lock().unwrap().clone() {
            return Err(DockerError::NotFound(message));
        }
        Ok(ImageInspect {
            id: format!("sha256:{image:.8}"),
        })
    }

    async fn create_container(
        &self,
        _name: &str,
        config: &ContainerConfig,
    ) -> Result<String, DockerError> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = format!("container-{next_id}");
        self.containers
            .lock()
            .unwrap()
            .insert(id.clone(), config.clone());
        Ok(id)
    }

    async fn start_container(&self, id: &str) -> Result<(), DockerError> {
        if self.containers.lock().unwrap().contains_key(id) {
            Ok(())
        } else {
            Err(DockerError::NotFound(format!("no such container: {id}")))
        }
    }

    async fn wait_container(&self, _id: &str) -> Result<i64, DockerError> {
        Ok(*self.wait_status.lock().unwrap())
    }

    async fn remove_container(&self, id: &str, _force: bool) -> Result<(), DockerError> {
        self.containers.lock().unwrap().remove(id);
        Ok(())
    }
}
