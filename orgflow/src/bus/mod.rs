//! In-memory publish/subscribe event bus.
//!
//! The bus decouples producers of lifecycle and diagnostic events from
//! their consumers. Every subscriber owns a bounded FIFO mailbox; sends
//! never block, so a slow or crashed consumer cannot stall a producing
//! agent. Global listeners receive a copy of every notification
//! regardless of its address and are served best-effort.

mod forwarder;
mod metrics;
mod notification;

pub use forwarder::LogForwarder;
pub use metrics::BusMetrics;
pub use notification::{
    Notification, NotificationKind, ERROR_IDENTITY, LOG_IDENTITY,
};

use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::debug;

use crate::cancellation::CancelToken;
use crate::errors::BusError;

/// Fixed capacity of every mailbox.
///
/// Large enough to absorb a full pipeline run's worth of lifecycle events
/// for the expected number of concurrent agents.
pub const MAILBOX_CAPACITY: usize = 128;

/// A bounded FIFO queue of notifications owned by one subscriber.
///
/// Dropping the mailbox ends the subscription; subsequent direct sends to
/// its identity report [`BusError::MailboxNotFound`].
#[derive(Debug)]
pub struct Mailbox {
    rx: mpsc::Receiver<Notification>,
}

impl Mailbox {
    /// Receives the next notification, waiting until one arrives.
    ///
    /// Returns `None` once the mailbox has been replaced by a newer
    /// subscription for the same identity (or the bus was dropped) and
    /// all queued notifications have been read.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Receives the next notification without waiting.
    #[must_use]
    pub fn try_recv(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }

    /// Drains every notification currently queued.
    #[must_use]
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Some(n) = self.try_recv() {
            out.push(n);
        }
        out
    }
}

/// The in-memory publish/subscribe hub.
///
/// Constructed once per run and handed to every agent and the
/// orchestrator; there is no process-global instance.
#[derive(Debug, Default)]
pub struct EventBus {
    /// Addressed mailboxes, one sender per subscriber identity.
    mailboxes: RwLock<HashMap<String, mpsc::Sender<Notification>>>,
    /// Global listeners; this list only grows for the life of the bus.
    globals: RwLock<Vec<mpsc::Sender<Notification>>>,
    /// Delivery counters.
    metrics: BusMetrics,
}

impl EventBus {
    /// Creates a new, empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bounded mailbox for `identity`.
    ///
    /// Replaces any existing mailbox for the same identity; unread
    /// notifications are not handed off, so subscribers must register
    /// before any producer targets them.
    pub fn subscribe(&self, identity: impl Into<String>) -> Mailbox {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        self.mailboxes.write().insert(identity.into(), tx);
        Mailbox { rx }
    }

    /// Registers an additional global mailbox that receives a copy of
    /// every notification regardless of its address.
    pub fn subscribe_global(&self) -> Mailbox {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        self.globals.write().push(tx);
        Mailbox { rx }
    }

    /// Returns whether a mailbox is currently registered for `identity`.
    #[must_use]
    pub fn is_registered(&self, identity: &str) -> bool {
        self.mailboxes.read().contains_key(identity)
    }

    /// Delivers a copy to every global mailbox, then to the addressed
    /// mailbox.
    ///
    /// Global delivery is best-effort: a momentarily full global mailbox
    /// silently drops that copy. Direct delivery is non-blocking and
    /// fails with [`BusError::MailboxNotFound`] or
    /// [`BusError::MailboxFull`]; either failure still leaves the global
    /// copies delivered.
    pub fn send(&self, notification: &Notification) -> Result<(), BusError> {
        self.send_with(notification, None)
    }

    /// Like [`EventBus::send`], but a cancellation signal observed at the
    /// same instant as a full mailbox is surfaced as
    /// [`BusError::Cancelled`] rather than [`BusError::MailboxFull`].
    pub fn send_with(
        &self,
        notification: &Notification,
        cancel: Option<&CancelToken>,
    ) -> Result<(), BusError> {
        self.fan_out_to_globals(notification);

        let target = self.mailboxes.read().get(&notification.to).cloned();
        let Some(tx) = target else {
            self.metrics.record_dropped();
            return Err(BusError::MailboxNotFound {
                to: notification.to.clone(),
            });
        };

        match tx.try_send(notification.clone()) {
            Ok(()) => {
                self.metrics.record_delivered();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.record_dropped();
                if let Some(token) = cancel {
                    if token.is_cancelled() {
                        return Err(BusError::Cancelled {
                            reason: token.reason_or_default(),
                        });
                    }
                }
                Err(BusError::MailboxFull {
                    to: notification.to.clone(),
                })
            }
            // The owning Mailbox was dropped; the subscription is gone.
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.metrics.record_dropped();
                Err(BusError::MailboxNotFound {
                    to: notification.to.clone(),
                })
            }
        }
    }

    /// Delivers to every global listener and every registered mailbox,
    /// regardless of the notification's address, best-effort: a full
    /// mailbox drops that one copy rather than failing the call.
    pub fn broadcast(&self, notification: &Notification) {
        self.fan_out_to_globals(notification);

        let targets: Vec<_> = self.mailboxes.read().values().cloned().collect();
        for tx in targets {
            match tx.try_send(notification.clone()) {
                Ok(()) => self.metrics.record_delivered(),
                Err(_) => {
                    self.metrics.record_dropped();
                    debug!(
                        kind = %notification.kind,
                        "broadcast copy dropped"
                    );
                }
            }
        }
    }

    /// Returns the bus delivery metrics.
    #[must_use]
    pub fn metrics(&self) -> &BusMetrics {
        &self.metrics
    }

    fn fan_out_to_globals(&self, notification: &Notification) {
        let globals = self.globals.read();
        for tx in globals.iter() {
            match tx.try_send(notification.clone()) {
                Ok(()) => self.metrics.record_delivered(),
                Err(_) => {
                    self.metrics.record_dropped();
                    debug!(
                        kind = %notification.kind,
                        "global copy dropped"
                    );
                }
            }
        }
    }
}
