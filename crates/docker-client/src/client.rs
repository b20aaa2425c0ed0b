//! Docker Engine API client
//!
//! Talks to the engine over HTTP (`DOCKER_HOST`, e.g. "http://localhost:2375").
//! Pulls return the engine's newline-delimited JSON progress stream as a
//! stream of lines so the caller can interpret embedded errors itself.

use crate::docker_trait::{DockerClientTrait, PullStream};
use crate::error::DockerError;
use crate::models::{
    split_image_reference, ContainerConfig, ContainerCreated, ContainerWait, ImageInspect,
    RegistryConnDetails,
};
use futures::{Stream, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Docker Engine API client
#[derive(Clone)]
pub struct DockerClient {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for DockerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct EngineError {
    message: String,
}

impl DockerClient {
    /// Create a new engine client
    ///
    /// # Arguments
    /// * `base_url` - Engine endpoint (e.g. "http://localhost:2375")
    pub fn new(base_url: String) -> Result<Self, DockerError> {
        // No overall request timeout: pulls and waits are long-running.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(DockerError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the engine endpoint
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn error_for_status(response: Response) -> Result<Response, DockerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<EngineError>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        if status == StatusCode::NOT_FOUND {
            return Err(DockerError::NotFound(message));
        }
        Err(DockerError::Api(format!("{status}: {message}")))
    }
}

#[async_trait::async_trait]
impl DockerClientTrait for DockerClient {
    async fn pull(
        &self,
        image: &str,
        auth: Option<&RegistryConnDetails>,
    ) -> Result<PullStream, DockerError> {
        let (name, tag) = split_image_reference(image);
        let url = format!(
            "{}/images/create?fromImage={}&tag={}",
            self.base_url,
            urlencoding::encode(&name),
            urlencoding::encode(&tag)
        );
        debug!("Pulling image {}:{}", name, tag);

        let mut request = self.client.post(&url);
        if let Some(auth) = auth {
            request = request.header("X-Registry-Auth", auth.auth_header()?);
        }
        let response = request.send().await?;
        let response = Self::error_for_status(response).await?;

        Ok(into_lines(response.bytes_stream()))
    }

    async fn inspect_image(&self, image: &str) -> Result<ImageInspect, DockerError> {
        let url = format!(
            "{}/images/{}/json",
            self.base_url,
            urlencoding::encode(image)
        );
        debug!("Inspecting image {}", image);

        let response = self.client.get(&url).send().await?;
        let response = Self::error_for_status(response).await?;
        Ok(response.json::<ImageInspect>().await?)
    }

    async fn create_container(
        &self,
        name: &str,
        config: &ContainerConfig,
    ) -> Result<String, DockerError> {
        let url = format!(
            "{}/containers/create?name={}",
            self.base_url,
            urlencoding::encode(name)
        );
        debug!("Creating container {} from {}", name, config.image);

        let response = self.client.post(&url).json(config).send().await?;
        let response = Self::error_for_status(response).await?;
        Ok(response.json::<ContainerCreated>().await?.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), DockerError> {
        let url = format!("{}/containers/{}/start", self.base_url, id);
        let response = self.client.post(&url).send().await?;
        Self::error_for_status(response).await?;
        Ok(())
    }

    async fn wait_container(&self, id: &str) -> Result<i64, DockerError> {
        let url = format!("{}/containers/{}/wait", self.base_url, id);
        let response = self.client.post(&url).send().await?;
        let response = Self::error_for_status(response).await?;
        Ok(response.json::<ContainerWait>().await?.status_code)
    }

    async fn remove_container(&self, id: &str, force: bool) -> Result<(), DockerError> {
        let url = format!("{}/containers/{}?force={}", self.base_url, id, force);
        let response = self.client.delete(&url).send().await?;
        match Self::error_for_status(response).await {
            Ok(_) | Err(DockerError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Re-frame a chunked byte stream into trimmed, non-empty lines.
///
/// A transport error terminates the stream after being yielded, so the
/// consumer never mistakes a broken pull for a clean completion.
fn into_lines<S, B>(stream: S) -> PullStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + 'static,
{
    let state = (stream.boxed(), Vec::new(), false);
    futures::stream::unfold(state, |(mut stream, mut buf, mut done)| async move {
        loop {
            if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&raw).trim().to_string();
                if line.is_empty() {
                    continue;
                }
                return Some((Ok(line), (stream, buf, done)));
            }
            if done {
                if buf.is_empty() {
                    return None;
                }
                let line = String::from_utf8_lossy(&buf).trim().to_string();
                buf.clear();
                if line.is_empty() {
                    return None;
                }
                return Some((Ok(line), (stream, buf, done)));
            }
            match stream.next().await {
                Some(Ok(chunk)) => buf.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    buf.clear();
                    return Some((Err(DockerError::Http(e)), (stream, buf, true)));
                }
                None => done = true,
            }
        }
    })
    .boxed()
}
