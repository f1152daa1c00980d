use serde::{Deserialize, Serialize};

use crate::{ContainerId, LEASE_KEY_PREFIX, ProxyEndpoint};

/// Exclusive claim on one proxy container.
///
/// The claim itself lives in the lease store under [`ProxyLease::lock_key`];
/// this value only carries what was copied out of the proxy record when the claim succeeded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyLease {
    pub container_id: ContainerId,
    pub lock_key: String,
    pub endpoint: ProxyEndpoint,
}

impl ProxyLease {
    pub fn new(container_id: impl Into<ContainerId>, endpoint: ProxyEndpoint) -> Self {
        let container_id = container_id.into();
        Self {
            lock_key: Self::key_for(&container_id),
            container_id,
            endpoint,
        }
    }

    /// Lease store key guarding the given proxy container.
    pub fn key_for(container_id: &str) -> String {
        format!("{LEASE_KEY_PREFIX}{container_id}")
    }
}
