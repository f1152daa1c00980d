use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use pvx_model::ProvisionOutcome;

use crate::error::CoreError;

pub(crate) type ResultTx = oneshot::Sender<Result<ProvisionOutcome, CoreError>>;
pub(crate) type ResultRx = oneshot::Receiver<Result<ProvisionOutcome, CoreError>>;

/// Caller side of a dispatched provisioning request.
#[derive(Debug)]
pub struct ProvisionHandle {
    request_id: Uuid,
    task: String,
    cancel: CancellationToken,
    rx: ResultRx,
}

impl ProvisionHandle {
    pub(crate) fn new(request_id: Uuid, task: String, cancel: CancellationToken, rx: ResultRx) -> Self {
        Self {
            request_id,
            task,
            cancel,
            rx,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Name of the supervisor task running the request.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Ask the request not to start. Has no effect once provisioning is under way.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the terminal state.
    pub async fn wait(self) -> Result<ProvisionOutcome, CoreError> {
        self.rx
            .await
            .map_err(|_| CoreError::Supervisor(format!("task {} dropped its result", self.task)))?
    }
}
