//! Detached provisioning on top of a taskvisor [`Supervisor`].
//!
//! Each request becomes one task with restart `Never`, submitted through the controller.
//! The caller gets a [`ProvisionHandle`] whose result channel reports the terminal state.
mod handle;
pub use handle::ProvisionHandle;

mod task;
pub use task::{PROVISION_TASK_PREFIX, provision_task, run_request, task_name, to_controller_spec};

use std::sync::Arc;

use async_trait::async_trait;
use taskvisor::{ControllerConfig, Subscribe, Supervisor, SupervisorConfig};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use pvx_model::ProvisionRequest;

use crate::{error::CoreError, provisioner::Provisioner};

/// Hands a request off for asynchronous execution.
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    async fn dispatch(&self, req: ProvisionRequest) -> Result<ProvisionHandle, CoreError>;
}

/// Owns the supervisor run loop and the shared [`Provisioner`].
pub struct ProvisionSupervisor {
    sup: Arc<Supervisor>,
    provisioner: Provisioner,
}

impl ProvisionSupervisor {
    /// Build the supervisor, start its run loop in background and wait until it accepts tasks.
    pub async fn new(
        provisioner: Provisioner,
        sup_cfg: SupervisorConfig,
        ctrl_cfg: ControllerConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let sup = Supervisor::builder(sup_cfg)
            .with_subscribers(subscribers)
            .with_controller(ctrl_cfg)
            .build();

        let runner = Arc::clone(&sup);
        tokio::spawn(async move {
            if let Err(e) = runner.run(Vec::new()).await {
                error!(error = %e, "supervisor run loop exited");
            }
        });
        sup.wait_ready().await;
        info!("supervisor is ready to accept provisioning tasks");
        Self { sup, provisioner }
    }

    pub fn provisioner(&self) -> &Provisioner {
        &self.provisioner
    }
}

#[async_trait]
impl Dispatcher for ProvisionSupervisor {
    #[instrument(level = "debug", skip(self, req), fields(request = %req.request_id))]
    async fn dispatch(&self, req: ProvisionRequest) -> Result<ProvisionHandle, CoreError> {
        let (tx, rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let request_id = req.request_id;

        let name = task_name(&req);
        let task = provision_task(self.provisioner.clone(), req, cancel.clone(), tx);

        debug!(task = %name, "submitting via controller");
        self.sup
            .submit(to_controller_spec(task))
            .await
            .map_err(|e| CoreError::Supervisor(e.to_string()))?;

        Ok(ProvisionHandle::new(request_id, name, cancel, rx))
    }
}
