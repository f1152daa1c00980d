//! Metrics collection abstraction for the provisioning engine.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are handed to the
//! [`crate::Provisioner`] at construction time.
mod backend;
pub use backend::{LeaseEvent, MetricsBackend, MetricsHandle, ProvisionVerdict};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
