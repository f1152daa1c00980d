//! Role classification of running containers.
//!
//! Label string matching happens here and nowhere else: everything downstream works
//! with [`ContainerRecord`] variants.
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use pvx_model::{
    ContainerRecord, LABEL_TARGET, LABEL_TASK_OWNER, LABEL_VPN_HTTP_PORT, LABEL_VPN_REGION,
    LABEL_VPN_SOCKS_PORT, Labels, ModelError, PROXY_OWNER, ProxyEndpoint, RecordRole, Role,
    WorkerInfo, short_id,
};

use crate::{
    config::ProvisionerConfig,
    error::CoreError,
    gateway::{RawContainer, RuntimeGateway},
};

/// Read-only projection of the runtime, re-fetched on every call.
#[derive(Clone)]
pub struct RegistryView {
    gateway: Arc<dyn RuntimeGateway>,
    network: String,
    log_viewer_path: String,
}

impl RegistryView {
    pub fn new(gateway: Arc<dyn RuntimeGateway>, cfg: &ProvisionerConfig) -> Self {
        Self {
            gateway,
            network: cfg.proxy_network.clone(),
            log_viewer_path: cfg.log_viewer_path.clone(),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn RuntimeGateway> {
        &self.gateway
    }

    /// Role implied by the `TaskOwner` label, `None` for unrelated containers.
    pub fn role_of(labels: &Labels) -> Option<Role> {
        match labels.get_non_empty(LABEL_TASK_OWNER)? {
            PROXY_OWNER => Some(Role::Proxy),
            _ => Some(Role::Worker),
        }
    }

    /// Running containers of the given role, in runtime order.
    #[instrument(level = "debug", skip(self, role), fields(role = %role))]
    pub async fn list_by_role(&self, role: Role) -> Result<Vec<ContainerRecord>, CoreError> {
        let raw = self.gateway.list_containers().await?;
        trace!(total = raw.len(), "listed running containers");

        let mut out = Vec::new();
        for container in &raw {
            if Self::role_of(&container.labels) != Some(role) {
                continue;
            }
            out.push(self.classify(container, role)?);
        }
        debug!(matched = out.len(), "containers classified");
        Ok(out)
    }

    /// Like [`RegistryView::list_by_role`] with the role given as text.
    pub async fn list_by_role_name(&self, role: &str) -> Result<Vec<ContainerRecord>, CoreError> {
        let role = role.parse::<Role>()?;
        self.list_by_role(role).await
    }

    /// Number of running workers; the admission gate.
    pub async fn count_workers(&self) -> Result<usize, CoreError> {
        let raw = self.gateway.list_containers().await?;
        Ok(raw
            .iter()
            .filter(|c| Self::role_of(&c.labels) == Some(Role::Worker))
            .count())
    }

    /// Build the typed record of a container already known to have `role`.
    pub fn classify(&self, raw: &RawContainer, role: Role) -> Result<ContainerRecord, CoreError> {
        let id = short_id(&raw.id);
        let role = match role {
            Role::Worker => RecordRole::Worker(self.worker_info(&id, &raw.labels)),
            Role::Proxy => RecordRole::Proxy(self.proxy_endpoint(&id, raw)?),
        };
        Ok(ContainerRecord { id, role })
    }

    fn worker_info(&self, id: &str, labels: &Labels) -> WorkerInfo {
        let label = |key| labels.get(key).unwrap_or_default().to_string();
        WorkerInfo {
            owner: label(LABEL_TASK_OWNER),
            target: label(LABEL_TARGET),
            region: label(LABEL_VPN_REGION),
            log_url: format!("{}?container_id={id}", self.log_viewer_path),
        }
    }

    fn proxy_endpoint(&self, id: &str, raw: &RawContainer) -> Result<ProxyEndpoint, CoreError> {
        let address = raw
            .networks
            .get(&self.network)
            .filter(|ip| !ip.is_empty())
            .ok_or_else(|| CoreError::MissingNetwork {
                container: id.to_string(),
                network: self.network.clone(),
            })?;

        let socks = raw
            .labels
            .get_non_empty(LABEL_VPN_SOCKS_PORT)
            .ok_or_else(|| CoreError::MissingLabel {
                container: id.to_string(),
                label: LABEL_VPN_SOCKS_PORT,
            })?;

        let http_port = raw
            .labels
            .get_non_empty(LABEL_VPN_HTTP_PORT)
            .map(|v| parse_port(LABEL_VPN_HTTP_PORT, v))
            .transpose()?;

        Ok(ProxyEndpoint {
            address: address.clone(),
            socks_port: parse_port(LABEL_VPN_SOCKS_PORT, socks)?,
            http_port,
            region: raw.labels.get(LABEL_VPN_REGION).unwrap_or_default().to_string(),
        })
    }
}

fn parse_port(label: &'static str, value: &str) -> Result<u16, ModelError> {
    value.trim().parse().map_err(|_| ModelError::InvalidPort {
        label,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{StubGateway, proxy, unrelated, worker};

    fn view(gw: StubGateway) -> RegistryView {
        RegistryView::new(Arc::new(gw), &ProvisionerConfig::default())
    }

    #[test]
    fn role_of_is_total() {
        let mut labels = Labels::new();
        assert_eq!(RegistryView::role_of(&labels), None);

        labels.insert(LABEL_TASK_OWNER, "");
        assert_eq!(RegistryView::role_of(&labels), None);

        labels.insert(LABEL_TASK_OWNER, PROXY_OWNER);
        assert_eq!(RegistryView::role_of(&labels), Some(Role::Proxy));

        labels.insert(LABEL_TASK_OWNER, "some-request");
        assert_eq!(RegistryView::role_of(&labels), Some(Role::Worker));
    }

    #[tokio::test]
    async fn splits_containers_by_role() {
        let gw = StubGateway::new(vec![
            worker("aaaaaaaaaaaaffff", "req-1"),
            proxy("bbbbbbbbbbbbffff", "10.0.0.5", 1080),
            unrelated("cccccccccccc"),
            worker("dddddddddddd", "req-2"),
        ]);
        let view = view(gw);

        let workers = view.list_by_role(Role::Worker).await.unwrap();
        let ids: Vec<_> = workers.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["aaaaaaaaaaaa", "dddddddddddd"]);
        let w = workers[0].as_worker().unwrap();
        assert_eq!(w.owner, "req-1");
        assert_eq!(w.log_url, "/logs-viewer?container_id=aaaaaaaaaaaa");

        let proxies = view.list_by_role(Role::Proxy).await.unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].id, "bbbbbbbbbbbb");
        let p = proxies[0].as_proxy().unwrap();
        assert_eq!(p.address, "10.0.0.5");
        assert_eq!(p.socks_port, 1080);

        assert_eq!(view.count_workers().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn proxy_without_network_fails_loudly() {
        let mut bad = proxy("bbbbbbbbbbbb", "10.0.0.5", 1080);
        bad.networks.clear();
        let view = view(StubGateway::new(vec![bad, worker("aaaaaaaaaaaa", "req")]));

        let err = view.list_by_role(Role::Proxy).await.unwrap_err();
        assert!(matches!(err, CoreError::MissingNetwork { ref network, .. } if network == "scraper_vpn"));

        assert_eq!(view.list_by_role(Role::Worker).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn proxy_port_labels_are_validated() {
        let mut missing = proxy("bbbbbbbbbbbb", "10.0.0.5", 1080);
        missing.labels = [(LABEL_TASK_OWNER, PROXY_OWNER)].into_iter().collect();
        let err = view(StubGateway::new(vec![missing]))
            .list_by_role(Role::Proxy)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingLabel { label: LABEL_VPN_SOCKS_PORT, .. }));

        let mut garbage = proxy("bbbbbbbbbbbb", "10.0.0.5", 1080);
        garbage.labels.insert(LABEL_VPN_HTTP_PORT, "http");
        let err = view(StubGateway::new(vec![garbage]))
            .list_by_role(Role::Proxy)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Model(ModelError::InvalidPort { .. })));
    }

    #[tokio::test]
    async fn unknown_role_name_is_rejected() {
        let view = view(StubGateway::new(Vec::new()));
        let err = view.list_by_role_name("vpn").await.unwrap_err();
        assert!(matches!(err, CoreError::Model(ModelError::InvalidRole(_))));
    }
}
