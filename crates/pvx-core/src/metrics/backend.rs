use std::sync::Arc;

use pvx_model::{ProvisionOutcome, Rejection};

use crate::error::CoreError;

/// Terminal state of one provisioning request, for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionVerdict {
    Provisioned,
    Busy,
    NoProxy,
    Invalid,
    Failed,
    Canceled,
}

impl ProvisionVerdict {
    /// Classify the result of [`crate::Provisioner::provision`].
    pub fn of(result: &Result<ProvisionOutcome, CoreError>) -> Self {
        match result {
            Ok(ProvisionOutcome::Provisioned(_)) => ProvisionVerdict::Provisioned,
            Ok(ProvisionOutcome::Rejected(Rejection::Busy { .. })) => ProvisionVerdict::Busy,
            Ok(ProvisionOutcome::Rejected(Rejection::NoProxy)) => ProvisionVerdict::NoProxy,
            Ok(ProvisionOutcome::Rejected(Rejection::InvalidRequest)) => ProvisionVerdict::Invalid,
            Err(CoreError::Canceled) => ProvisionVerdict::Canceled,
            Err(_) => ProvisionVerdict::Failed,
        }
    }

    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ProvisionVerdict::Provisioned => "provisioned",
            ProvisionVerdict::Busy => "busy",
            ProvisionVerdict::NoProxy => "no_proxy",
            ProvisionVerdict::Invalid => "invalid",
            ProvisionVerdict::Failed => "failed",
            ProvisionVerdict::Canceled => "canceled",
        }
    }
}

/// Lease lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseEvent {
    /// A proxy was claimed.
    Acquired,
    /// Every proxy was already claimed (or none was running).
    Exhausted,
    /// A release was issued.
    Released,
}

impl LeaseEvent {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            LeaseEvent::Acquired => "acquired",
            LeaseEvent::Exhausted => "exhausted",
            LeaseEvent::Released => "released",
        }
    }
}

/// Backend metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Called when a provisioning request starts executing.
    fn record_provision_started(&self);
    /// Called once per request with its terminal verdict and wall time.
    fn record_provision_completed(&self, verdict: ProvisionVerdict, duration_ms: u64);
    /// Called on every acquire/release outcome.
    fn record_lease(&self, event: LeaseEvent);
    /// Called when the runtime rejects an operation.
    ///
    /// `operation` is one of [`crate::GatewayError::operation`].
    fn record_gateway_error(&self, operation: &str);
}

/// Shared handle to a metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;

    #[test]
    fn verdict_classifies_results() {
        let busy = Ok(ProvisionOutcome::Rejected(Rejection::Busy {
            running: 5,
            ceiling: 5,
        }));
        assert_eq!(ProvisionVerdict::of(&busy), ProvisionVerdict::Busy);

        let no_proxy = Ok(ProvisionOutcome::Rejected(Rejection::NoProxy));
        assert_eq!(ProvisionVerdict::of(&no_proxy), ProvisionVerdict::NoProxy);

        let failed = Err(CoreError::Gateway(GatewayError::CreateFailed("boom".into())));
        assert_eq!(ProvisionVerdict::of(&failed), ProvisionVerdict::Failed);

        let canceled = Err(CoreError::Canceled);
        assert_eq!(ProvisionVerdict::of(&canceled).as_label(), "canceled");
    }
}
