use crate::metrics::backend::{LeaseEvent, MetricsBackend, ProvisionVerdict};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_provision_started(&self) {}

    #[inline(always)]
    fn record_provision_completed(&self, _: ProvisionVerdict, _: u64) {}

    #[inline(always)]
    fn record_lease(&self, _: LeaseEvent) {}

    #[inline(always)]
    fn record_gateway_error(&self, _: &str) {}
}
