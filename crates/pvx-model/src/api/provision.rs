use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ContainerId, ProxyLease, TargetType};

/// Request to launch one worker container for one scrape target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    /// Identifier generated by the caller; becomes the worker's owner label.
    pub request_id: Uuid,
    pub target: TargetType,
    pub target_url: String,
    pub target_name: String,
}

impl ProvisionRequest {
    pub fn new(
        request_id: Uuid,
        target: TargetType,
        target_url: impl Into<String>,
        target_name: impl Into<String>,
    ) -> Self {
        Self {
            request_id,
            target,
            target_url: target_url.into(),
            target_name: target_name.into(),
        }
    }

    /// Owner identifier written to the worker's `TaskOwner` label.
    pub fn owner(&self) -> String {
        self.request_id.to_string()
    }
}

/// Terminal state of a provisioning request that did not fail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum ProvisionOutcome {
    /// Worker container created; the lease stays held until released out of band.
    Provisioned(Provisioned),
    /// Request was turned away before any container was created.
    Rejected(Rejection),
}

impl ProvisionOutcome {
    pub fn is_provisioned(&self) -> bool {
        matches!(self, ProvisionOutcome::Provisioned(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provisioned {
    pub container_id: ContainerId,
    pub lease: ProxyLease,
}

/// Expected, user-visible reasons for turning a request away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "reason")]
pub enum Rejection {
    /// The admission ceiling is reached.
    Busy { running: usize, ceiling: usize },
    /// Every proxy is currently leased.
    NoProxy,
    /// The request is missing its target URL or name.
    InvalidRequest,
}

impl Rejection {
    /// Short stable name used in logs and metrics.
    pub const fn as_label(&self) -> &'static str {
        match self {
            Rejection::Busy { .. } => "busy",
            Rejection::NoProxy => "no_proxy",
            Rejection::InvalidRequest => "invalid_request",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Busy { running, ceiling } => {
                write!(f, "busy: {running} of {ceiling} workers running")
            }
            Rejection::NoProxy => f.write_str("no proxy available"),
            Rejection::InvalidRequest => f.write_str("invalid request"),
        }
    }
}
