use serde::{Deserialize, Serialize};

use crate::ContainerId;

/// Snapshot of a running container that belongs to the provisioning system.
///
/// Produced by classifying raw runtime state; never cached across queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRecord {
    /// Short container identifier.
    pub id: ContainerId,
    /// Role-specific details.
    pub role: RecordRole,
}

impl ContainerRecord {
    pub fn as_worker(&self) -> Option<&WorkerInfo> {
        match &self.role {
            RecordRole::Worker(w) => Some(w),
            RecordRole::Proxy(_) => None,
        }
    }

    pub fn as_proxy(&self) -> Option<&ProxyEndpoint> {
        match &self.role {
            RecordRole::Proxy(p) => Some(p),
            RecordRole::Worker(_) => None,
        }
    }
}

/// Role of a classified container together with the fields that only make sense for that role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "role")]
pub enum RecordRole {
    Worker(WorkerInfo),
    Proxy(ProxyEndpoint),
}

/// Worker attribution read back from labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerInfo {
    /// Request identifier that owns the worker.
    pub owner: String,
    /// Human readable target name.
    pub target: String,
    /// Region of the proxy the worker was routed through.
    pub region: String,
    /// Log viewer reference for this worker.
    pub log_url: String,
}

/// Connection details of a proxy container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEndpoint {
    /// Private address on the proxy network.
    pub address: String,
    pub socks_port: u16,
    pub http_port: Option<u16>,
    pub region: String,
}

impl ProxyEndpoint {
    /// SOCKS5 URL workers use as `PROXY_ADDRESS`.
    pub fn socks_url(&self) -> String {
        format!("socks5://{}:{}", self.address, self.socks_port)
    }
}
