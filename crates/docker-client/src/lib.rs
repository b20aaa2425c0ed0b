//! Docker Engine API Client
//!
//! A thin client for the Docker Engine HTTP API covering what the
//! provisioning worker needs: pulling images (as a line stream of progress
//! records), inspecting the local image store, and running one-shot action
//! containers.
//!
//! # Example
//!
//! ```no_run
//! use docker_client::{DockerClient, DockerClientTrait};
//! use futures::StreamExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DockerClient::new("http://localhost:2375".to_string())?;
//!
//! let mut stream = client.pull("alpine:3.20", None).await?;
//! while let Some(line) = stream.next().await {
//!     println!("{}", line?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod docker_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::DockerClient;
pub use docker_trait::{DockerClientTrait, PullStream};
pub use error::DockerError;
pub use models::*;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockDockerClient;
