//! Wire types for the Docker Engine API

use crate::error::DockerError;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// One structured line of an image pull progress stream.
///
/// The engine emits newline-delimited JSON; a line may carry a progress
/// `status` or an embedded `error` message. An embedded error is distinct
/// from a transport-level failure of the pull request itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullProgress {
    /// Progress description (e.g. "Downloading")
    #[serde(default)]
    pub status: Option<String>,

    /// Embedded pull error reported by the engine
    #[serde(default)]
    pub error: Option<String>,

    /// Layer identifier the line refers to
    #[serde(default)]
    pub id: Option<String>,
}

/// Registry credentials for authenticated pulls; absent means anonymous
#[derive(Debug, Clone, Default)]
pub struct RegistryConnDetails {
    /// Registry host (e.g. "registry.example.com")
    pub registry: String,

    /// Account username
    pub username: String,

    /// Account password or token
    pub password: String,
}

#[derive(Serialize)]
struct AuthConfig<'a> {
    username: &'a str,
    password: &'a str,
    serveraddress: &'a str,
}

impl RegistryConnDetails {
    /// Encode the credentials as an `X-Registry-Auth` header value
    pub fn auth_header(&self) -> Result<String, DockerError> {
        let config = AuthConfig {
            username: &self.username,
            password: &self.password,
            serveraddress: &self.registry,
        };
        let payload = serde_json::to_vec(&config)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(payload))
    }
}

/// Subset of the image inspect response the worker cares about
#[derive(Debug, Clone, Deserialize)]
pub struct ImageInspect {
    /// Content-addressable image ID
    #[serde(rename = "Id")]
    pub id: String,
}

/// Container creation request
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContainerConfig {
    /// Image reference to run
    #[serde(rename = "Image")]
    pub image: String,

    /// Command to execute
    #[serde(rename = "Cmd", skip_serializing_if = "Vec::is_empty")]
    pub cmd: Vec<String>,

    /// Environment variables, KEY=value
    #[serde(rename = "Env", skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
}

/// Container creation response
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerCreated {
    /// Identifier of the created container
    #[serde(rename = "Id")]
    pub id: String,
}

/// Container wait response
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerWait {
    /// Exit code of the container's main process
    #[serde(rename = "StatusCode")]
    pub status_code: i64,
}

/// Split an image reference into repository and tag, defaulting to "latest"
pub fn split_image_reference(image: &str) -> (String, String) {
    // The tag separator is the last ':' after the last '/', so registry
    // ports ("host:5000/app") don't get mistaken for tags.
    let slash = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[slash..].rfind(':') {
        Some(colon) => {
            let at = slash + colon;
            (image[..at].to_string(), image[at + 1..].to_string())
        }
        None => (image.to_string(), "latest".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_image_reference_with_tag() {
        let (name, tag) = split_image_reference("alpine:3.20");
        assert_eq!(name, "alpine");
        assert_eq!(tag, "3.20");
    }

    #[test]
    fn test_split_image_reference_defaults_to_latest() {
        let (name, tag) = split_image_reference("alpine");
        assert_eq!(name, "alpine");
        assert_eq!(tag, "latest");
    }

    #[test]
    fn test_split_image_reference_ignores_registry_port() {
        let (name, tag) = split_image_reference("registry.local:5000/tools/agent");
        assert_eq!(name, "registry.local:5000/tools/agent");
        assert_eq!(tag, "latest");
    }

    #[test]
    fn test_pull_progress_parses_embedded_error() {
        let progress: PullProgress =
            serde_json::from_str(r#"{"error": "You missed the shot"}"#).unwrap();
        assert_eq!(progress.error.as_deref(), Some("You missed the shot"));
        assert!(progress.status.is_none());
    }
}
