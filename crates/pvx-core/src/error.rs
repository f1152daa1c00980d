use thiserror::Error;

use pvx_model::ModelError;

use crate::{gateway::GatewayError, store::StoreError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("proxy container {container} is not attached to network '{network}'")]
    MissingNetwork { container: String, network: String },

    #[error("proxy container {container} has no '{label}' label")]
    MissingLabel {
        container: String,
        label: &'static str,
    },

    #[error("supervisor error: {0}")]
    Supervisor(String),

    #[error("provisioning canceled before it started")]
    Canceled,
}
