//! Prometheus implementation of [`pvx_core::MetricsBackend`].
//!
//! ```rust
//! use std::sync::Arc;
//! use pvx_core::{MetricsBackend, MetricsHandle, ProvisionVerdict};
//! use pvx_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), prometheus::Error> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: MetricsHandle = Arc::new(metrics.clone());
//! handle.record_provision_completed(ProvisionVerdict::Busy, 3);
//!
//! let text = metrics.encode()?;
//! assert!(text.contains("pvx_provisions_completed_total"));
//! # Ok(())
//! # }
//! ```
//!
//! Serving the text over HTTP is left to the embedding application.
mod backend;
pub use backend::PrometheusMetrics;
