use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid target type: {0} (expected: hotel|resto|airline)")]
    InvalidTargetType(String),

    #[error("invalid container role: {0} (expected: worker|proxy)")]
    InvalidRole(String),

    #[error("invalid port in label '{label}': {value}")]
    InvalidPort { label: &'static str, value: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
