use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("lease store unavailable: {0}")]
    Unavailable(String),

    #[error("lease store command failed: {0}")]
    Command(String),
}
