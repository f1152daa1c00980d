use serde::{Deserialize, Serialize};

use crate::{Env, Labels};

/// Declarative description of a worker container to launch.
///
/// Built once per provisioning request and consumed by container creation.
/// Fields are read-only after construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfig {
    image: String,
    env: Env,
    labels: Labels,
    tty: bool,
}

impl ContainerConfig {
    /// Create a configuration with a pseudo-TTY attached, as the worker image expects.
    pub fn new(image: impl Into<String>, env: Env, labels: Labels) -> Self {
        Self {
            image: image.into(),
            env,
            labels,
            tty: true,
        }
    }

    /// Image reference (e.g. `ghcr.io/org/scraper:latest`).
    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn tty(&self) -> bool {
        self.tty
    }
}
