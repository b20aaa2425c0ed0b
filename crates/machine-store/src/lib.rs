//! Machine Resource Store
//!
//! Typed CRUD access to the durable provisioning objects (Workflow, BmcJob,
//! Hardware) backed by the Kubernetes API. Status writes are conditional on
//! the observed resource version, so overlapping reconciliation passes for
//! the same Workflow surface as a retryable conflict instead of silently
//! overwriting each other.
//!
//! # Example
//!
//! ```no_run
//! use machine_store::{KubeMachineStore, MachineStoreTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let store = KubeMachineStore::new(client);
//!
//! if let Some(job) = store.get_job("default", "netboot").await? {
//!     println!("job uid: {:?}", job.metadata.uid);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod store;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use error::StoreError;
pub use store::KubeMachineStore;
pub use store_trait::MachineStoreTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockMachineStore;
