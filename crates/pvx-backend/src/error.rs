use thiserror::Error;

/// Failures while constructing an adapter.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("cannot connect to container runtime: {0}")]
    Runtime(String),

    #[error("cannot connect to lease store: {0}")]
    Store(String),

    #[error("invalid adapter configuration: {0}")]
    InvalidConfig(String),
}
