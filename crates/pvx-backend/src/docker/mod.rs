//! [`RuntimeGateway`] over the Docker Engine API.
mod convert;
pub use convert::{size_from_tar_header, to_raw_container};

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use bollard::{
    API_DEFAULT_VERSION, Docker,
    container::{
        Config, CreateContainerOptions, DownloadFromContainerOptions, ListContainersOptions,
        LogOutput, LogsOptions, RemoveContainerOptions,
    },
    errors::Error as DockerError,
    image::CreateImageOptions,
    models::HostConfig,
};
use futures::{Stream, StreamExt, future};
use tracing::{debug, error, info, instrument, trace};

use pvx_core::{GatewayError, LogStream, RawContainer, RuntimeGateway};
use pvx_model::{ContainerConfig, ContainerId, short_id};

use crate::BackendError;

use convert::{is_not_found, map_err};

const SOCKET_TIMEOUT_SECS: u64 = 120;

/// Docker-backed runtime gateway. Cheap to clone.
#[derive(Clone, Debug)]
pub struct DockerGateway {
    docker: Docker,
}

impl DockerGateway {
    /// Connect through `DOCKER_HOST` or the platform default socket.
    pub fn connect_local() -> Result<Self, BackendError> {
        let docker =
            Docker::connect_with_local_defaults().map_err(|e| BackendError::Runtime(e.to_string()))?;
        Ok(Self { docker })
    }

    /// Connect through an explicit unix socket.
    pub fn connect_socket(path: &Path) -> Result<Self, BackendError> {
        let path = path
            .to_str()
            .ok_or_else(|| BackendError::InvalidConfig(format!("non-utf8 socket path {path:?}")))?;
        let docker = Docker::connect_with_socket(path, SOCKET_TIMEOUT_SECS, API_DEFAULT_VERSION)
            .map_err(|e| BackendError::Runtime(e.to_string()))?;
        Ok(Self { docker })
    }

    /// Round-trip to the daemon.
    pub async fn ping(&self) -> Result<(), GatewayError> {
        self.docker
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| GatewayError::RuntimeUnavailable(e.to_string()))
    }

    /// Start a freshly created container. A container that fails to start is removed again.
    async fn start_or_discard(&self, full_id: &str) -> Result<ContainerId, GatewayError> {
        let id = short_id(full_id);
        let err = match self.docker.start_container::<String>(full_id, None).await {
            Ok(()) => {
                info!(container = %id, "container started");
                return Ok(id);
            }
            Err(e) => map_err(e, |r| GatewayError::CreateFailed(format!("start: {r}"))),
        };

        if let Err(cleanup) = self.remove_container(full_id).await {
            error!(container = %id, error = %cleanup, "failed to remove container that did not start");
        }
        Err(err)
    }
}

/// Adapt a Docker log stream. Dropping the result drops the underlying request;
/// the stream ends after the first error.
fn log_chunks<S>(id: String, logs: S) -> LogStream
where
    S: Stream<Item = Result<LogOutput, DockerError>> + Send + 'static,
{
    let mut failed = false;
    logs.map(move |chunk| {
        chunk
            .map(|out| out.into_bytes().to_vec())
            .map_err(|e| GatewayError::LogsFailed {
                id: id.clone(),
                reason: e.to_string(),
            })
    })
    .take_while(move |item| {
        let keep = !failed;
        failed |= item.is_err();
        future::ready(keep)
    })
    .boxed()
}

#[async_trait]
impl RuntimeGateway for DockerGateway {
    async fn list_containers(&self) -> Result<Vec<RawContainer>, GatewayError> {
        let filters = HashMap::from([("status".to_string(), vec!["running".to_string()])]);
        let opts = ListContainersOptions::<String> {
            all: false,
            filters,
            ..Default::default()
        };

        let summaries = self
            .docker
            .list_containers(Some(opts))
            .await
            .map_err(|e| GatewayError::RuntimeUnavailable(e.to_string()))?;
        trace!(count = summaries.len(), "docker list");
        Ok(summaries.into_iter().filter_map(to_raw_container).collect())
    }

    #[instrument(level = "debug", skip(self, config), fields(image = config.image()))]
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, GatewayError> {
        let labels: HashMap<String, String> = config.labels().clone().into();
        let body = Config {
            image: Some(config.image().to_string()),
            env: Some(config.env().to_assignments()),
            labels: Some(labels),
            tty: Some(config.tty()),
            host_config: Some(HostConfig {
                auto_remove: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(None::<CreateContainerOptions<String>>, body)
            .await
            .map_err(|e| map_err(e, GatewayError::CreateFailed))?;
        self.start_or_discard(&created.id).await
    }

    async fn remove_container(&self, id: &str) -> Result<(), GatewayError> {
        let opts = RemoveContainerOptions {
            force: true,
            v: true,
            ..Default::default()
        };
        self.docker
            .remove_container(id, Some(opts))
            .await
            .map_err(|e| {
                map_err(e, |reason| GatewayError::RemoveFailed {
                    id: id.to_string(),
                    reason,
                })
            })?;
        info!(container = id, "container removed");
        Ok(())
    }

    async fn pull_image(&self, image: &str) -> Result<(), GatewayError> {
        let opts = CreateImageOptions {
            from_image: image.to_string(),
            ..Default::default()
        };
        let mut progress = self.docker.create_image(Some(opts), None, None);

        while let Some(step) = progress.next().await {
            let step = step.map_err(|e| {
                map_err(e, |reason| GatewayError::PullFailed {
                    image: image.to_string(),
                    reason,
                })
            })?;
            if let Some(status) = step.status {
                debug!(image, %status, "pull");
            }
        }
        info!(image, "image pulled");
        Ok(())
    }

    fn stream_logs(&self, id: &str) -> LogStream {
        let opts = LogsOptions::<String> {
            follow: true,
            stdout: true,
            ..Default::default()
        };
        trace!(container = id, "following logs");
        log_chunks(id.to_string(), self.docker.logs(id, Some(opts)))
    }

    async fn stat_path(&self, id: &str, path: &str) -> Result<Option<u64>, GatewayError> {
        let opts = DownloadFromContainerOptions {
            path: path.to_string(),
        };
        let mut archive = self.docker.download_from_container(id, Some(opts));

        let mut header = Vec::with_capacity(512);
        while header.len() < 512 {
            match archive.next().await {
                Some(Ok(bytes)) => header.extend_from_slice(&bytes),
                Some(Err(e)) if is_not_found(&e) => return Ok(None),
                Some(Err(e)) => {
                    return Err(GatewayError::StatFailed {
                        id: id.to_string(),
                        path: path.to_string(),
                        reason: e.to_string(),
                    });
                }
                None => break,
            }
        }

        size_from_tar_header(&header)
            .map(Some)
            .ok_or_else(|| GatewayError::StatFailed {
                id: id.to_string(),
                path: path.to_string(),
                reason: "malformed archive header".into(),
            })
    }
}
