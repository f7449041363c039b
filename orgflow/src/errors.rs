//! Error types for the orgflow pipeline.
//!
//! Errors are split by layer: [`BusError`] for event delivery,
//! [`AgentError`] for a single agent invocation, and [`PipelineError`]
//! for the orchestrated run. Agent errors are always both returned to the
//! caller and published as an ERROR notification, so synchronous callers
//! and asynchronous observers learn of the same failure.

use thiserror::Error;

/// Errors returned by a direct send on the event bus.
///
/// Only the addressed delivery can fail; delivery to global listeners is
/// best-effort and never surfaces here.
#[derive(Debug, Clone, Error)]
pub enum BusError {
    /// No mailbox is registered under the target identity.
    #[error("no mailbox registered for '{to}'")]
    MailboxNotFound {
        /// The identity the notification was addressed to.
        to: String,
    },

    /// The addressed mailbox is at capacity.
    #[error("mailbox for '{to}' is full")]
    MailboxFull {
        /// The identity the notification was addressed to.
        to: String,
    },

    /// A cancellation signal was observed while the mailbox was full.
    #[error("send cancelled: {reason}")]
    Cancelled {
        /// The cancellation reason.
        reason: String,
    },
}

/// Errors returned by a single `Agent::process` invocation.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Neither a deterministic executor nor a generative backend is
    /// available for this agent.
    #[error("agent '{role}' has no execution engine")]
    NoExecutionEngine {
        /// The agent's role name.
        role: String,
    },

    /// The generative backend call itself failed.
    #[error("generative call failed for '{role}': {reason}")]
    GenerativeCallFailed {
        /// The agent's role name.
        role: String,
        /// Description of the backend failure.
        reason: String,
    },

    /// The reply text is not valid structured data for the response type.
    ///
    /// Carries both the raw reply and the fence-stripped text for
    /// diagnosis.
    #[error("failed to decode reply: {source}")]
    ResponseDecode {
        /// The reply exactly as the backend returned it.
        raw: String,
        /// The reply after code-fence stripping.
        cleaned: String,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// The reply text was empty after cleanup.
    #[error("backend returned an empty reply")]
    EmptyResponse,

    /// The request could not be serialized for the generative backend.
    #[error("failed to serialize request: {0}")]
    Serialization(String),

    /// The invocation was cancelled.
    #[error("cancelled: {reason}")]
    Cancelled {
        /// The cancellation reason.
        reason: String,
    },

    /// A deterministic executor reported a failure.
    #[error("executor failed: {0}")]
    Executor(String),
}

impl AgentError {
    /// Returns true for cancellation failures, which must propagate
    /// upward rather than being folded into per-unit recovery.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Errors returned by an orchestrated pipeline run.
///
/// Only President/Manager failures and cancellation abort a run; per-unit
/// Section/Worker failures are recovered into the summary instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A single-shot stage failed, aborting the run.
    #[error("'{role}' stage failed: {source}")]
    Stage {
        /// The role whose invocation failed.
        role: String,
        /// The underlying agent error.
        source: AgentError,
    },

    /// The run was cancelled.
    #[error("pipeline run cancelled: {reason}")]
    Cancelled {
        /// The cancellation reason.
        reason: String,
    },
}

impl PipelineError {
    /// Wraps a fatal stage failure, promoting cancellation to the
    /// run-level variant.
    #[must_use]
    pub fn fatal(role: impl Into<String>, source: AgentError) -> Self {
        match source {
            AgentError::Cancelled { reason } => Self::Cancelled { reason },
            other => Self::Stage {
                role: role.into(),
                source: other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_error_display() {
        let err = BusError::MailboxNotFound { to: "log".to_string() };
        assert_eq!(err.to_string(), "no mailbox registered for 'log'");

        let err = BusError::MailboxFull { to: "log".to_string() };
        assert_eq!(err.to_string(), "mailbox for 'log' is full");
    }

    #[test]
    fn test_agent_error_is_cancelled() {
        let err = AgentError::Cancelled { reason: "deadline".to_string() };
        assert!(err.is_cancelled());

        let err = AgentError::EmptyResponse;
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_fatal_promotes_cancellation() {
        let err = PipelineError::fatal(
            "president",
            AgentError::Cancelled { reason: "user".to_string() },
        );
        assert!(matches!(err, PipelineError::Cancelled { .. }));

        let err = PipelineError::fatal("president", AgentError::EmptyResponse);
        assert!(matches!(err, PipelineError::Stage { ref role, .. } if role == "president"));
    }

    #[test]
    fn test_response_decode_carries_both_texts() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = AgentError::ResponseDecode {
            raw: "```json\nnot json\n```".to_string(),
            cleaned: "not json".to_string(),
            source,
        };

        if let AgentError::ResponseDecode { raw, cleaned, .. } = &err {
            assert!(raw.contains("```"));
            assert!(!cleaned.contains("```"));
        } else {
            unreachable!();
        }
    }
}
