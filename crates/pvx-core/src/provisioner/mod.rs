//! Provisioning orchestrator: admission, lease, configure, create.
mod stage;
pub use stage::ProvisionStage;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, error, info, instrument, warn};

use pvx_model::{ProvisionOutcome, ProvisionRequest, Provisioned, Rejection};

use crate::{
    config::ProvisionerConfig,
    error::CoreError,
    gateway::RuntimeGateway,
    generator::ConfigGenerator,
    lease::LeaseManager,
    metrics::{MetricsHandle, ProvisionVerdict},
    registry::RegistryView,
    store::LeaseStore,
};

/// Runs one provisioning request through its state machine.
///
/// Stateless: every decision is made against the runtime and the lease store, so any number
/// of provisioners (in one process or many) may run side by side.
#[derive(Clone)]
pub struct Provisioner {
    registry: RegistryView,
    leases: LeaseManager,
    generator: ConfigGenerator,
    max_workers: usize,
    metrics: MetricsHandle,
}

impl Provisioner {
    pub fn new(
        gateway: Arc<dyn RuntimeGateway>,
        store: Arc<dyn LeaseStore>,
        cfg: &ProvisionerConfig,
        metrics: MetricsHandle,
    ) -> Self {
        let registry = RegistryView::new(gateway, cfg);
        let leases = LeaseManager::new(registry.clone(), store, metrics.clone());
        Self {
            generator: ConfigGenerator::from_config(cfg),
            max_workers: cfg.max_workers,
            registry,
            leases,
            metrics,
        }
    }

    pub fn registry(&self) -> &RegistryView {
        &self.registry
    }

    pub fn leases(&self) -> &LeaseManager {
        &self.leases
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Admission gate. `Some(Busy)` when the worker ceiling is reached.
    pub async fn admit(&self) -> Result<Option<Rejection>, CoreError> {
        let running = self.registry.count_workers().await?;
        if running >= self.max_workers {
            return Ok(Some(Rejection::Busy {
                running,
                ceiling: self.max_workers,
            }));
        }
        Ok(None)
    }

    /// Run `req` to a terminal state.
    ///
    /// On success the lease stays held; it is released out of band through
    /// [`LeaseManager::release`] once the worker is done. A failed creation releases the
    /// lease before the error is returned.
    #[instrument(level = "info", skip(self, req), fields(request = %req.request_id, target = %req.target))]
    pub async fn provision(&self, req: &ProvisionRequest) -> Result<ProvisionOutcome, CoreError> {
        self.metrics.record_provision_started();
        let started = Instant::now();

        let result = self.run(req).await;
        if let Err(CoreError::Gateway(e)) = &result {
            self.metrics.record_gateway_error(e.operation());
        }

        let verdict = ProvisionVerdict::of(&result);
        self.metrics
            .record_provision_completed(verdict, elapsed_ms(started.elapsed()));
        match &result {
            Ok(outcome) => debug!(verdict = verdict.as_label(), ?outcome, "provisioning finished"),
            Err(e) => error!(verdict = verdict.as_label(), error = %e, "provisioning failed"),
        }
        result
    }

    async fn run(&self, req: &ProvisionRequest) -> Result<ProvisionOutcome, CoreError> {
        stage(ProvisionStage::Received);
        if req.target_url.trim().is_empty() || req.target_name.trim().is_empty() {
            warn!("request without target url or name");
            return Ok(ProvisionOutcome::Rejected(Rejection::InvalidRequest));
        }

        stage(ProvisionStage::Validated);
        if let Some(busy) = self.admit().await? {
            info!(%busy, "request rejected");
            return Ok(ProvisionOutcome::Rejected(busy));
        }

        stage(ProvisionStage::LeaseAcquisition);
        let Some(lease) = self.leases.acquire().await? else {
            info!("request rejected: no proxy available");
            return Ok(ProvisionOutcome::Rejected(Rejection::NoProxy));
        };

        stage(ProvisionStage::Configuring);
        let config = self.generator.generate(
            req.target,
            &req.target_name,
            &req.target_url,
            &req.owner(),
            &lease.endpoint,
        );

        stage(ProvisionStage::Creating);
        match self.registry.gateway().create_container(&config).await {
            Ok(container_id) => {
                info!(container = %container_id, proxy = %lease.container_id, "worker provisioned");
                Ok(ProvisionOutcome::Provisioned(Provisioned {
                    container_id,
                    lease,
                }))
            }
            Err(create_err) => {
                warn!(error = %create_err, proxy = %lease.container_id, "worker creation failed");
                stage(ProvisionStage::LeaseReleased);
                if let Err(release_err) = self.leases.release(&lease.container_id).await {
                    error!(error = %release_err, lease_key = %lease.lock_key, "lease leaked after failed creation");
                }
                Err(create_err.into())
            }
        }
    }
}

#[inline]
fn stage(s: ProvisionStage) {
    debug!(stage = s.as_str(), "provisioning stage");
}

/// Milliseconds in `d`, saturating at `u64::MAX`.
fn elapsed_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use pvx_model::TargetType;

    use crate::{
        gateway::GatewayError,
        metrics::noop_metrics,
        store::MemoryLeaseStore,
        testkit::{CountingLeaseStore, StubGateway, proxy, worker},
    };

    #[test]
    fn elapsed_ms_saturates() {
        assert_eq!(elapsed_ms(Duration::from_millis(1500)), 1500);
        assert_eq!(elapsed_ms(Duration::MAX), u64::MAX);
    }

    fn hotel_request() -> ProvisionRequest {
        ProvisionRequest::new(
            Uuid::new_v4(),
            TargetType::Hotel,
            "https://www.tripadvisor.com/Hotel_Review-x",
            "Hotel_X",
        )
    }

    #[tokio::test]
    async fn provisions_worker_and_keeps_lease() {
        let gw = Arc::new(StubGateway::new(vec![proxy("aaaaaaaaaaaa", "10.0.0.5", 1080)]));
        let store = Arc::new(MemoryLeaseStore::new());
        let p = Provisioner::new(gw.clone(), store.clone(), &ProvisionerConfig::default(), noop_metrics());

        let outcome = p.provision(&hotel_request()).await.unwrap();
        let ProvisionOutcome::Provisioned(done) = outcome else {
            panic!("expected provisioned, got {outcome:?}");
        };
        assert_eq!(done.lease.container_id, "aaaaaaaaaaaa");
        assert!(store.contains("proxy-usage:aaaaaaaaaaaa"));

        let created = gw.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].env().get("SCRAPE_MODE"), Some("HOTEL"));
        assert_eq!(created[0].env().get("PROXY_ADDRESS"), Some("socks5://10.0.0.5:1080"));
    }

    #[tokio::test]
    async fn ceiling_reached_attempts_no_lease() {
        let mut containers: Vec<_> = (0..5)
            .map(|i| worker(&format!("{i:012}"), &format!("req-{i}")))
            .collect();
        containers.push(proxy("aaaaaaaaaaaa", "10.0.0.5", 1080));
        let gw = Arc::new(StubGateway::new(containers));
        let store = Arc::new(CountingLeaseStore::new());
        let p = Provisioner::new(gw.clone(), store.clone(), &ProvisionerConfig::default(), noop_metrics());

        let outcome = p.provision(&hotel_request()).await.unwrap();
        assert_eq!(
            outcome,
            ProvisionOutcome::Rejected(Rejection::Busy {
                running: 5,
                ceiling: 5
            })
        );
        assert_eq!(store.set_calls(), 0);
        assert_eq!(gw.create_calls(), 0);
    }

    #[tokio::test]
    async fn no_free_proxy_is_a_rejection() {
        let gw = Arc::new(StubGateway::new(vec![proxy("aaaaaaaaaaaa", "10.0.0.5", 1080)]));
        let store = Arc::new(MemoryLeaseStore::new());
        store.set_if_absent("proxy-usage:aaaaaaaaaaaa").await.unwrap();
        let p = Provisioner::new(gw.clone(), store, &ProvisionerConfig::default(), noop_metrics());

        let outcome = p.provision(&hotel_request()).await.unwrap();
        assert_eq!(outcome, ProvisionOutcome::Rejected(Rejection::NoProxy));
        assert_eq!(gw.create_calls(), 0);
    }

    #[tokio::test]
    async fn failed_creation_releases_lease() {
        let gw = Arc::new(
            StubGateway::new(vec![proxy("aaaaaaaaaaaa", "10.0.0.5", 1080)])
                .fail_create("image not found"),
        );
        let store = Arc::new(MemoryLeaseStore::new());
        let p = Provisioner::new(gw.clone(), store.clone(), &ProvisionerConfig::default(), noop_metrics());

        let err = p.provision(&hotel_request()).await.unwrap_err();
        assert!(matches!(err, CoreError::Gateway(GatewayError::CreateFailed(_))));
        assert!(!store.contains("proxy-usage:aaaaaaaaaaaa"));
        assert_eq!(gw.create_calls(), 1);
    }

    #[tokio::test]
    async fn empty_target_is_rejected_before_any_call() {
        let gw = Arc::new(StubGateway::new(vec![proxy("aaaaaaaaaaaa", "10.0.0.5", 1080)]));
        let p = Provisioner::new(
            gw.clone(),
            Arc::new(MemoryLeaseStore::new()),
            &ProvisionerConfig::default(),
            noop_metrics(),
        );
        let req = ProvisionRequest::new(Uuid::new_v4(), TargetType::Hotel, "  ", "X");

        let outcome = p.provision(&req).await.unwrap();
        assert_eq!(outcome, ProvisionOutcome::Rejected(Rejection::InvalidRequest));
        assert_eq!(gw.list_calls(), 0);
    }

    #[tokio::test]
    async fn runtime_outage_fails_the_request() {
        let gw = Arc::new(StubGateway::new(Vec::new()).unavailable());
        let p = Provisioner::new(
            gw,
            Arc::new(MemoryLeaseStore::new()),
            &ProvisionerConfig::default(),
            noop_metrics(),
        );

        let err = p.provision(&hotel_request()).await.unwrap_err();
        assert!(matches!(err, CoreError::Gateway(GatewayError::RuntimeUnavailable(_))));
    }
}
