//! Scripted doubles for the capability traits.
use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use futures::stream;

use pvx_model::{
    ContainerConfig, ContainerId, LABEL_TASK_OWNER, LABEL_VPN_REGION, LABEL_VPN_SOCKS_PORT, Labels,
    PROXY_NETWORK, PROXY_OWNER,
};

use crate::{
    gateway::{GatewayError, LogStream, RawContainer, RuntimeGateway},
    store::{LeaseStore, MemoryLeaseStore, StoreError},
};

/// Running worker owned by `owner`.
pub fn worker(id: &str, owner: &str) -> RawContainer {
    RawContainer {
        id: id.to_string(),
        labels: [(LABEL_TASK_OWNER, owner)].into_iter().collect(),
        networks: BTreeMap::new(),
    }
}

/// Running proxy attached to the VPN network.
pub fn proxy(id: &str, ip: &str, socks_port: u16) -> RawContainer {
    let mut labels = Labels::new();
    labels
        .insert(LABEL_TASK_OWNER, PROXY_OWNER)
        .insert(LABEL_VPN_SOCKS_PORT, socks_port.to_string())
        .insert(LABEL_VPN_REGION, "ch");
    RawContainer {
        id: id.to_string(),
        labels,
        networks: [(PROXY_NETWORK.to_string(), ip.to_string())]
            .into_iter()
            .collect(),
    }
}

/// Running container that belongs to nobody.
pub fn unrelated(id: &str) -> RawContainer {
    RawContainer {
        id: id.to_string(),
        ..RawContainer::default()
    }
}

/// In-memory runtime returning a fixed container list.
#[derive(Debug, Default)]
pub struct StubGateway {
    containers: Vec<RawContainer>,
    create_failure: Option<String>,
    unavailable: bool,
    created: Mutex<Vec<ContainerConfig>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl StubGateway {
    pub fn new(containers: Vec<RawContainer>) -> Self {
        Self {
            containers,
            ..Self::default()
        }
    }

    /// Make every `create_container` fail with `reason`.
    pub fn fail_create(mut self, reason: &str) -> Self {
        self.create_failure = Some(reason.to_string());
        self
    }

    /// Make every call fail as if the runtime were unreachable.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Configurations passed to successful `create_container` calls.
    pub fn created(&self) -> Vec<ContainerConfig> {
        self.created.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if self.unavailable {
            return Err(GatewayError::RuntimeUnavailable("stub runtime is down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RuntimeGateway for StubGateway {
    async fn list_containers(&self) -> Result<Vec<RawContainer>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.containers.clone())
    }

    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, GatewayError> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if let Some(reason) = &self.create_failure {
            return Err(GatewayError::CreateFailed(reason.clone()));
        }
        self.created
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(config.clone());
        Ok(format!("{n:012x}"))
    }

    async fn remove_container(&self, _id: &str) -> Result<(), GatewayError> {
        self.check_available()
    }

    async fn pull_image(&self, _image: &str) -> Result<(), GatewayError> {
        self.check_available()
    }

    fn stream_logs(&self, id: &str) -> LogStream {
        let chunks = vec![
            Ok(format!("{id} started\n").into_bytes()),
            Ok(b"done\n".to_vec()),
        ];
        Box::pin(stream::iter(chunks))
    }

    async fn stat_path(&self, _id: &str, _path: &str) -> Result<Option<u64>, GatewayError> {
        self.check_available()?;
        Ok(None)
    }
}

/// [`MemoryLeaseStore`] that counts calls.
#[derive(Debug, Default)]
pub struct CountingLeaseStore {
    inner: MemoryLeaseStore,
    set_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl CountingLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }
}

#[async_trait]
impl LeaseStore for CountingLeaseStore {
    async fn set_if_absent(&self, key: &str) -> Result<bool, StoreError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set_if_absent(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }
}
