use thiserror::Error;

/// Failures reported by a [`crate::RuntimeGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("failed to create container: {0}")]
    CreateFailed(String),

    #[error("failed to remove container {id}: {reason}")]
    RemoveFailed { id: String, reason: String },

    #[error("failed to pull image {image}: {reason}")]
    PullFailed { image: String, reason: String },

    #[error("failed to stream logs of container {id}: {reason}")]
    LogsFailed { id: String, reason: String },

    #[error("failed to stat {path} in container {id}: {reason}")]
    StatFailed {
        id: String,
        path: String,
        reason: String,
    },
}

impl GatewayError {
    /// Operation name used as a low-cardinality metrics label.
    pub const fn operation(&self) -> &'static str {
        match self {
            GatewayError::RuntimeUnavailable(_) => "connect",
            GatewayError::CreateFailed(_) => "create",
            GatewayError::RemoveFailed { .. } => "remove",
            GatewayError::PullFailed { .. } => "pull",
            GatewayError::LogsFailed { .. } => "logs",
            GatewayError::StatFailed { .. } => "stat",
        }
    }
}
