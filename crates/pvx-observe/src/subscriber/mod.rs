//! Logs supervisor events of detached provisioning tasks.
//!
//! Provisioning runs outside the caller's request, so this is where its failures surface.
use std::borrow::Borrow;

use async_trait::async_trait;
use taskvisor::{Event, EventKind, Subscribe};
use tracing::{debug, error, info, trace, warn};

use pvx_core::supervisor::PROVISION_TASK_PREFIX;

const QUEUE_CAPACITY: usize = 1024;

/// taskvisor subscriber that turns events into tracing lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProvisionEventLogger;

#[async_trait]
impl Subscribe for ProvisionEventLogger {
    async fn on_event(&self, event: &Event) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "provision-event-logger"
    }

    fn queue_capacity(&self) -> usize {
        QUEUE_CAPACITY
    }
}

/// Request id encoded in a provisioning task name, or the name itself for other tasks.
fn request_of(task: &str) -> &str {
    task.strip_prefix(PROVISION_TASK_PREFIX).unwrap_or(task)
}

fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());
    let request = request_of(e.task());

    match e.kind() {
        EventKind::TaskStarting => info!(request, attempt = e.attempt(), "{msg}"),
        EventKind::TaskStopped => debug!(request, "{msg}"),
        EventKind::TaskFailed => error!(request, reason = e.reason(), "{msg}"),
        EventKind::ActorDead => error!(request, reason = e.reason(), "{msg}"),
        EventKind::ActorExhausted => debug!(request, "{msg}"),
        EventKind::TimeoutHit => warn!(request, timeout_ms = e.timeout_ms(), "{msg}"),

        EventKind::ControllerRejected => warn!(request, reason = e.reason(), "{msg}"),
        EventKind::ControllerSubmitted | EventKind::ControllerSlotTransition => {
            trace!(request, reason = e.reason(), "{msg}")
        }

        EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
            error!(task = e.task(), reason = e.reason(), "{msg}")
        }
        EventKind::ShutdownRequested | EventKind::AllStoppedWithinGrace => info!("{msg}"),
        EventKind::GraceExceeded => warn!("{msg}"),

        _ => trace!(task = e.task(), "{msg}"),
    }
}

/// Field access with defaults for absent values.
trait View {
    fn task(&self) -> &str;
    fn reason(&self) -> &str;
    fn attempt(&self) -> u32;
    fn timeout_ms(&self) -> u32;
    fn kind(&self) -> EventKind;
}

impl<T: Borrow<Event>> View for T {
    fn task(&self) -> &str {
        self.borrow().task.as_deref().unwrap_or("unknown")
    }

    fn reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("none")
    }

    fn attempt(&self) -> u32 {
        self.borrow().attempt.unwrap_or(0)
    }

    fn timeout_ms(&self) -> u32 {
        self.borrow().timeout_ms.unwrap_or(0)
    }

    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
}

fn message_for(kind: EventKind) -> &'static str {
    match kind {
        EventKind::TaskStarting => "provisioning started",
        EventKind::TaskStopped => "provisioning finished",
        EventKind::TaskFailed => "provisioning failed",
        EventKind::ActorDead => "provisioning task died",
        EventKind::ActorExhausted => "provisioning task done, no restart",
        EventKind::TimeoutHit => "provisioning task timed out",
        EventKind::ControllerRejected => "provisioning request dropped by controller",
        EventKind::ControllerSubmitted => "provisioning request queued",
        EventKind::ControllerSlotTransition => "provisioning slot changed state",
        EventKind::SubscriberPanicked => "event subscriber panicked",
        EventKind::SubscriberOverflow => "event dropped, subscriber queue full",
        EventKind::ShutdownRequested => "shutdown requested",
        EventKind::AllStoppedWithinGrace => "all tasks stopped within grace period",
        EventKind::GraceExceeded => "grace period exceeded, tasks still running",
        _ => "supervisor event",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_is_extracted_from_task_name() {
        assert_eq!(request_of("provision-1234"), "1234");
        assert_eq!(request_of("other-task"), "other-task");
    }

    #[test]
    fn provisioning_kinds_have_specific_messages() {
        assert_eq!(message_for(EventKind::TaskFailed), "provisioning failed");
        assert_eq!(message_for(EventKind::TaskStarting), "provisioning started");
        assert_ne!(
            message_for(EventKind::ControllerRejected),
            message_for(EventKind::ControllerSubmitted)
        );
    }
}
