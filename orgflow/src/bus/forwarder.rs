//! Forwards the conventional log and error mailboxes into `tracing`.

use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{EventBus, Mailbox, ERROR_IDENTITY, LOG_IDENTITY};
use crate::utils::format_iso8601;

/// A background task that subscribes the well-known `"log"` and
/// `"error"` identities and emits each received notification as a
/// `tracing` event.
///
/// This is the stock observer for terminal runs; UIs and other consumers
/// subscribe their own mailboxes instead. The task ends once its
/// mailboxes close - when the bus is dropped or another subscriber takes
/// over either identity.
#[derive(Debug)]
pub struct LogForwarder {
    handle: JoinHandle<()>,
}

impl LogForwarder {
    /// Subscribes the log and error sinks on `bus` and spawns the
    /// forwarding task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(bus: &EventBus) -> Self {
        let log = bus.subscribe(LOG_IDENTITY);
        let errors = bus.subscribe(ERROR_IDENTITY);
        let handle = tokio::spawn(forward(log, errors));
        Self { handle }
    }

    /// Returns whether the forwarding task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the forwarding task immediately, discarding queued
    /// notifications.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Waits for the forwarding task to end.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

async fn forward(mut log: Mailbox, mut errors: Mailbox) {
    loop {
        tokio::select! {
            n = log.recv() => {
                let Some(n) = n else { break };
                info!(
                    at = %format_iso8601(&n.timestamp),
                    from = %n.from,
                    kind = %n.kind,
                    payload = %n.payload,
                    "lifecycle notification"
                );
            }
            n = errors.recv() => {
                let Some(n) = n else { break };
                error!(
                    at = %format_iso8601(&n.timestamp),
                    from = %n.from,
                    payload = %n.payload,
                    "error notification"
                );
            }
        }
    }
}
