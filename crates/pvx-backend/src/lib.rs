mod error;
pub use error::BackendError;

#[cfg(feature = "docker")]
pub mod docker;

#[cfg(feature = "redis")]
pub mod redis;
