//! Capability interface over the container runtime.
//!
//! The core never talks to a runtime directly; concrete adapters (see `pvx-backend`)
//! implement [`RuntimeGateway`] and are injected as `Arc<dyn RuntimeGateway>`.
mod error;
pub use error::GatewayError;

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::stream::BoxStream;

use pvx_model::{ContainerConfig, ContainerId, Labels};

/// Lazy stream of raw log chunks. Ends when the container stops or the consumer drops it.
pub type LogStream = BoxStream<'static, Result<Vec<u8>, GatewayError>>;

/// Unclassified container as reported by the runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawContainer {
    /// Full runtime identifier.
    pub id: String,
    pub labels: Labels,
    /// Network name to private address.
    pub networks: BTreeMap<String, String>,
}

#[async_trait]
pub trait RuntimeGateway: Send + Sync + 'static {
    /// List currently running containers.
    async fn list_containers(&self) -> Result<Vec<RawContainer>, GatewayError>;

    /// Create and start a container; returns its short identifier.
    ///
    /// The container must not be removed automatically when its process exits.
    async fn create_container(&self, config: &ContainerConfig)
    -> Result<ContainerId, GatewayError>;

    /// Force-remove a container together with its volumes.
    async fn remove_container(&self, id: &str) -> Result<(), GatewayError>;

    /// Pull an image, consuming its progress stream.
    async fn pull_image(&self, image: &str) -> Result<(), GatewayError>;

    /// Follow the output of a container. The stream is not restartable.
    fn stream_logs(&self, id: &str) -> LogStream;

    /// Size of a file inside a container, `None` if the path does not exist.
    async fn stat_path(&self, id: &str, path: &str) -> Result<Option<u64>, GatewayError>;
}
