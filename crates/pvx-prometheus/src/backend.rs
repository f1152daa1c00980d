use std::sync::Arc;

use prometheus::{
    CounterVec, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use pvx_core::{LeaseEvent, MetricsBackend, ProvisionVerdict};

const NAMESPACE: &str = "pvx";

/// Provisioning metrics.
///
/// - `pvx_provisions_started_total`
/// - `pvx_provisions_completed_total{verdict}`
/// - `pvx_provision_duration_seconds`
/// - `pvx_lease_events_total{event}`
/// - `pvx_gateway_errors_total{operation}`
///
/// Every label takes values from a closed set.
#[derive(Clone)]
pub struct PrometheusMetrics {
    started: IntCounter,
    completed: CounterVec,
    duration: Histogram,
    lease_events: CounterVec,
    gateway_errors: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Register the metrics in an existing registry.
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let started = IntCounter::with_opts(
            Opts::new("provisions_started_total", "Provisioning requests started").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(started.clone()))?;

        let completed = CounterVec::new(
            Opts::new("provisions_completed_total", "Provisioning requests by terminal verdict")
                .namespace(NAMESPACE),
            &["verdict"],
        )?;
        registry.register(Box::new(completed.clone()))?;

        // Creation includes an image pull on a cold host, hence the long tail.
        let duration = Histogram::with_opts(
            HistogramOpts::new("provision_duration_seconds", "Wall time of a provisioning request")
                .namespace(NAMESPACE)
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 120.0]),
        )?;
        registry.register(Box::new(duration.clone()))?;

        let lease_events = CounterVec::new(
            Opts::new("lease_events_total", "Proxy lease acquisitions, exhaustions and releases")
                .namespace(NAMESPACE),
            &["event"],
        )?;
        registry.register(Box::new(lease_events.clone()))?;

        let gateway_errors = CounterVec::new(
            Opts::new("gateway_errors_total", "Container runtime failures by operation")
                .namespace(NAMESPACE),
            &["operation"],
        )?;
        registry.register(Box::new(gateway_errors.clone()))?;

        Ok(Self {
            started,
            completed,
            duration,
            lease_events,
            gateway_errors,
            registry,
        })
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition format of every registered metric.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.gather())
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_provision_started(&self) {
        self.started.inc();
    }

    fn record_provision_completed(&self, verdict: ProvisionVerdict, duration_ms: u64) {
        self.completed.with_label_values(&[verdict.as_label()]).inc();
        self.duration.observe(duration_ms as f64 / 1000.0);
    }

    fn record_lease(&self, event: LeaseEvent) {
        self.lease_events.with_label_values(&[event.as_label()]).inc();
    }

    fn record_gateway_error(&self, operation: &str) {
        self.gateway_errors.with_label_values(&[operation]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_provisions_by_verdict() {
        let m = PrometheusMetrics::new().unwrap();
        m.record_provision_started();
        m.record_provision_started();
        m.record_provision_completed(ProvisionVerdict::Provisioned, 1500);
        m.record_provision_completed(ProvisionVerdict::Busy, 2);

        let text = m.encode().unwrap();
        assert!(text.contains("pvx_provisions_started_total 2"), "{text}");
        assert!(text.contains(r#"pvx_provisions_completed_total{verdict="provisioned"} 1"#), "{text}");
        assert!(text.contains(r#"pvx_provisions_completed_total{verdict="busy"} 1"#), "{text}");
        assert!(text.contains("pvx_provision_duration_seconds_count 2"), "{text}");
    }

    #[test]
    fn counts_lease_events_and_gateway_errors() {
        let m = PrometheusMetrics::new().unwrap();
        m.record_lease(LeaseEvent::Acquired);
        m.record_lease(LeaseEvent::Released);
        m.record_lease(LeaseEvent::Released);
        m.record_gateway_error("create");

        let text = m.encode().unwrap();
        assert!(text.contains(r#"pvx_lease_events_total{event="released"} 2"#), "{text}");
        assert!(text.contains(r#"pvx_lease_events_total{event="acquired"} 1"#), "{text}");
        assert!(text.contains(r#"pvx_gateway_errors_total{operation="create"} 1"#), "{text}");
    }

    #[test]
    fn registering_twice_in_one_registry_fails() {
        let registry = Arc::new(Registry::new());
        PrometheusMetrics::with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::with_registry(registry).is_err());
    }
}
