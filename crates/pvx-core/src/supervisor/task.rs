use std::{sync::Arc, time::Duration};

use taskvisor::{
    AdmissionPolicy, BackoffPolicy, ControllerSpec, JitterPolicy, RestartPolicy, TaskError,
    TaskFn, TaskRef, TaskSpec,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pvx_model::ProvisionRequest;

use crate::{error::CoreError, provisioner::Provisioner, supervisor::handle::ResultTx};

/// Prefix of every provisioning task name; the request id follows.
pub const PROVISION_TASK_PREFIX: &str = "provision-";

/// Supervisor task name of a request.
pub fn task_name(req: &ProvisionRequest) -> String {
    format!("{PROVISION_TASK_PREFIX}{}", req.request_id)
}

/// Build the task body for one request.
///
/// The closure may be invoked by the supervisor more than once in theory; only the first
/// invocation owns the result sender.
pub fn provision_task(
    provisioner: Provisioner,
    req: ProvisionRequest,
    cancel: CancellationToken,
    tx: ResultTx,
) -> TaskRef {
    let name = task_name(&req);
    let tx = Arc::new(Mutex::new(Some(tx)));

    TaskFn::arc(name, move |ctx: CancellationToken| {
        let provisioner = provisioner.clone();
        let req = req.clone();
        let cancel = cancel.clone();
        let tx = Arc::clone(&tx);
        async move {
            let Some(tx) = tx.lock().await.take() else {
                warn!(request = %req.request_id, "provisioning task re-run ignored");
                return Ok(());
            };
            let stop = ctx.is_cancelled() || cancel.is_cancelled();
            run_request(&provisioner, &req, stop, tx).await
        }
    })
}

/// Drive `req` to a terminal state and publish it on `tx`.
///
/// `canceled` is checked once, before anything touches the runtime; a started request always
/// runs to completion so its lease is never abandoned halfway.
pub async fn run_request(
    provisioner: &Provisioner,
    req: &ProvisionRequest,
    canceled: bool,
    tx: ResultTx,
) -> Result<(), TaskError> {
    if canceled {
        debug!(request = %req.request_id, "provisioning canceled before start");
        let _ = tx.send(Err(CoreError::Canceled));
        return Err(TaskError::Canceled);
    }

    let result = provisioner.provision(req).await;
    let task_result = match &result {
        Ok(_) => Ok(()),
        Err(e) => Err(TaskError::Fail {
            reason: e.to_string(),
        }),
    };
    if tx.send(result).is_err() {
        debug!(request = %req.request_id, "provisioning result has no receiver");
    }
    task_result
}

/// Controller submission for a provisioning task: run once, never restart, no timeout.
pub fn to_controller_spec(task: TaskRef) -> ControllerSpec {
    let backoff = BackoffPolicy {
        first: Duration::ZERO,
        max: Duration::ZERO,
        jitter: JitterPolicy::None,
        factor: 1.0,
    };
    ControllerSpec {
        admission: AdmissionPolicy::DropIfRunning,
        task_spec: TaskSpec::new(task, RestartPolicy::Never, backoff, None),
    }
}
