//! Proxy lease protocol.
//!
//! A lease is nothing more than a `proxy-usage:<id>` key in the [`LeaseStore`]. Mutual
//! exclusion comes from the store's atomic set-if-absent; this type holds no state.
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use pvx_model::{ProxyLease, Role};

use crate::{
    error::CoreError,
    metrics::{LeaseEvent, MetricsHandle},
    registry::RegistryView,
    store::LeaseStore,
};

#[derive(Clone)]
pub struct LeaseManager {
    registry: RegistryView,
    store: Arc<dyn LeaseStore>,
    metrics: MetricsHandle,
}

impl LeaseManager {
    pub fn new(registry: RegistryView, store: Arc<dyn LeaseStore>, metrics: MetricsHandle) -> Self {
        Self {
            registry,
            store,
            metrics,
        }
    }

    /// Claim the first free proxy.
    ///
    /// Proxies are tried in runtime order, one store round-trip each. `Ok(None)` means every
    /// proxy is leased (or none is running); with no proxies the store is not contacted.
    #[instrument(level = "debug", skip(self))]
    pub async fn acquire(&self) -> Result<Option<ProxyLease>, CoreError> {
        let proxies = self.registry.list_by_role(Role::Proxy).await?;

        for record in proxies {
            let Some(endpoint) = record.as_proxy() else {
                continue;
            };
            let key = ProxyLease::key_for(&record.id);
            if self.store.set_if_absent(&key).await? {
                info!(container = %record.id, lease_key = %key, region = %endpoint.region, "proxy leased");
                self.metrics.record_lease(LeaseEvent::Acquired);
                return Ok(Some(ProxyLease::new(record.id.clone(), endpoint.clone())));
            }
            debug!(container = %record.id, "proxy already leased");
        }

        warn!("no free proxy");
        self.metrics.record_lease(LeaseEvent::Exhausted);
        Ok(None)
    }

    /// Drop the lease on `container_id`. Releasing a free proxy is a no-op.
    #[instrument(level = "debug", skip(self))]
    pub async fn release(&self, container_id: &str) -> Result<(), CoreError> {
        let key = ProxyLease::key_for(container_id);
        self.store.delete(&key).await?;

        info!(container = container_id, lease_key = %key, "proxy lease released");
        self.metrics.record_lease(LeaseEvent::Released);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;

    use crate::{
        config::ProvisionerConfig,
        metrics::noop_metrics,
        store::MemoryLeaseStore,
        testkit::{CountingLeaseStore, StubGateway, proxy, worker},
    };

    fn manager(gw: StubGateway, store: Arc<dyn LeaseStore>) -> LeaseManager {
        let registry = RegistryView::new(Arc::new(gw), &ProvisionerConfig::default());
        LeaseManager::new(registry, store, noop_metrics())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_acquire_on_single_proxy_has_one_winner() {
        let store = Arc::new(MemoryLeaseStore::new());
        let mgr = manager(
            StubGateway::new(vec![proxy("aaaaaaaaaaaa", "10.0.0.5", 1080)]),
            store.clone(),
        );

        let attempts = (0..16).map(|_| {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.acquire().await })
        });
        let results = join_all(attempts).await;

        let winners = results
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .filter(Option::is_some)
            .count();
        assert_eq!(winners, 1);
        assert!(store.contains("proxy-usage:aaaaaaaaaaaa"));
    }

    #[tokio::test]
    async fn loser_moves_on_to_next_proxy() {
        let store = Arc::new(MemoryLeaseStore::new());
        let mgr = manager(
            StubGateway::new(vec![
                proxy("aaaaaaaaaaaa", "10.0.0.5", 1080),
                proxy("bbbbbbbbbbbb", "10.0.0.6", 1081),
            ]),
            store.clone(),
        );

        let first = mgr.acquire().await.unwrap().unwrap();
        let second = mgr.acquire().await.unwrap().unwrap();
        assert_eq!(first.container_id, "aaaaaaaaaaaa");
        assert_eq!(second.container_id, "bbbbbbbbbbbb");
        assert_eq!(second.endpoint.socks_url(), "socks5://10.0.0.6:1081");

        assert!(mgr.acquire().await.unwrap().is_none());

        mgr.release("aaaaaaaaaaaa").await.unwrap();
        let again = mgr.acquire().await.unwrap().unwrap();
        assert_eq!(again.lock_key, "proxy-usage:aaaaaaaaaaaa");
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let store = Arc::new(MemoryLeaseStore::new());
        let mgr = manager(
            StubGateway::new(vec![proxy("aaaaaaaaaaaa", "10.0.0.5", 1080)]),
            store.clone(),
        );

        mgr.acquire().await.unwrap().unwrap();
        mgr.release("aaaaaaaaaaaa").await.unwrap();
        mgr.release("aaaaaaaaaaaa").await.unwrap();
        mgr.release("never-leased").await.unwrap();

        assert!(!store.contains("proxy-usage:aaaaaaaaaaaa"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn no_proxies_means_no_store_calls() {
        let store = Arc::new(CountingLeaseStore::new());
        let mgr = manager(
            StubGateway::new(vec![worker("aaaaaaaaaaaa", "req")]),
            store.clone(),
        );

        assert!(mgr.acquire().await.unwrap().is_none());
        assert_eq!(store.set_calls(), 0);
        assert_eq!(store.delete_calls(), 0);
    }
}
