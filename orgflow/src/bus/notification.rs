//! Notification type for lifecycle and diagnostic events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::{generate_uuid, now_utc};

/// Well-known identity for START/COMPLETE lifecycle notifications.
pub const LOG_IDENTITY: &str = "log";

/// Well-known identity for ERROR notifications.
pub const ERROR_IDENTITY: &str = "error";

/// The kind of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An agent invocation began.
    Start,
    /// An agent invocation finished successfully.
    Complete,
    /// An agent invocation or a pipeline unit failed.
    Error,
    /// An application-defined event.
    Custom(String),
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Complete => write!(f, "complete"),
            Self::Error => write!(f, "error"),
            Self::Custom(label) => write!(f, "{label}"),
        }
    }
}

/// An addressed lifecycle or diagnostic event.
///
/// Immutable once constructed; the bus clones it into every recipient
/// mailbox, so no state is shared after publish. Identity is the `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identity of this notification.
    pub id: Uuid,
    /// The publishing identity.
    pub from: String,
    /// The addressed identity.
    pub to: String,
    /// The notification kind.
    pub kind: NotificationKind,
    /// The event payload.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// When the notification was constructed.
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Creates a new notification.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: generate_uuid(),
            from: from.into(),
            to: to.into(),
            kind,
            payload,
            timestamp: now_utc(),
        }
    }

    /// Creates a START notification addressed to the log sink.
    #[must_use]
    pub fn start(from: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::new(from, LOG_IDENTITY, NotificationKind::Start, payload)
    }

    /// Creates a COMPLETE notification addressed to the log sink.
    #[must_use]
    pub fn complete(from: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::new(from, LOG_IDENTITY, NotificationKind::Complete, payload)
    }

    /// Creates an ERROR notification addressed to the error sink.
    #[must_use]
    pub fn error(from: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::new(from, ERROR_IDENTITY, NotificationKind::Error, payload)
    }

    /// Creates a custom notification with an application-defined label.
    #[must_use]
    pub fn custom(
        from: impl Into<String>,
        to: impl Into<String>,
        label: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::new(from, to, NotificationKind::Custom(label.into()), payload)
    }
}
