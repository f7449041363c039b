//! Generic typed agent.
//!
//! An [`Agent<Req, Resp>`] wraps one named transformation with a uniform
//! `process` contract over two execution strategies: a deterministic
//! executor supplied by the caller, or a generative backend bound at
//! construction. Every invocation publishes START and then exactly one of
//! COMPLETE or ERROR to the event bus, so observers see the full
//! lifecycle without coupling to the data flow.

mod backend;
mod config;
mod decode;
mod mocks;

pub use backend::{BackendError, GenerativeBackend};
pub use config::AgentConfig;
pub use decode::{decode_reply, strip_code_fences};
pub use mocks::ScriptedBackend;

#[cfg(test)]
pub use backend::MockGenerativeBackend;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::bus::{EventBus, Notification};
use crate::cancellation::CancelToken;
use crate::errors::AgentError;

/// A caller-supplied deterministic implementation of the agent's
/// transformation; bypasses serialization entirely.
pub type DeterministicFn<Req, Resp> =
    Box<dyn Fn(&Req) -> Result<Resp, AgentError> + Send + Sync>;

/// The execution strategy resolved for one invocation.
enum Strategy {
    Deterministic,
    Generative(Arc<dyn GenerativeBackend>),
}

/// One typed step of the pipeline.
///
/// The request and response types are bound at construction; the role
/// name doubles as the agent's publishing identity on the bus.
pub struct Agent<Req, Resp> {
    config: AgentConfig,
    bus: Arc<EventBus>,
    /// Present only when a backend was resolvable for this role.
    backend: Option<Arc<dyn GenerativeBackend>>,
    /// Attachable any time before invocation; always takes precedence
    /// over the generative binding.
    deterministic: RwLock<Option<DeterministicFn<Req, Resp>>>,
}

impl<Req, Resp> std::fmt::Debug for Agent<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("role", &self.config.role)
            .field("model", &self.config.model)
            .field("has_backend", &self.backend.is_some())
            .field("has_deterministic", &self.deterministic.read().is_some())
            .finish()
    }
}

impl<Req, Resp> Agent<Req, Resp>
where
    Req: Serialize + Send + Sync,
    Resp: DeserializeOwned + Send,
{
    /// Creates a new agent bound to `bus`, with `backend` absent when no
    /// credential or provider was resolvable for this role.
    #[must_use]
    pub fn new(
        config: AgentConfig,
        bus: Arc<EventBus>,
        backend: Option<Arc<dyn GenerativeBackend>>,
    ) -> Self {
        Self {
            config,
            bus,
            backend,
            deterministic: RwLock::new(None),
        }
    }

    /// Returns the agent's role name.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.config.role
    }

    /// Returns the agent's configuration.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Attaches a deterministic executor, replacing any previous one.
    pub fn set_deterministic<F>(&self, executor: F)
    where
        F: Fn(&Req) -> Result<Resp, AgentError> + Send + Sync + 'static,
    {
        *self.deterministic.write() = Some(Box::new(executor));
    }

    /// Builder form of [`Agent::set_deterministic`].
    #[must_use]
    pub fn with_deterministic<F>(self, executor: F) -> Self
    where
        F: Fn(&Req) -> Result<Resp, AgentError> + Send + Sync + 'static,
    {
        self.set_deterministic(executor);
        self
    }

    /// Returns whether a deterministic executor is attached.
    #[must_use]
    pub fn has_deterministic(&self) -> bool {
        self.deterministic.read().is_some()
    }

    /// Runs the agent's transformation on `request`.
    ///
    /// Publishes START before executing and exactly one of COMPLETE or
    /// ERROR afterwards; failures are returned to the caller as well, so
    /// synchronous callers and bus observers learn of the same outcome.
    pub async fn process(&self, request: Req, cancel: &CancelToken) -> Result<Resp, AgentError> {
        self.publish(
            Notification::start(
                &self.config.role,
                serde_json::json!({
                    "role": self.config.role,
                    "description": self.config.description,
                }),
            ),
            cancel,
        );

        let result = self.execute(request, cancel).await;

        match &result {
            Ok(_) => self.publish(
                Notification::complete(
                    &self.config.role,
                    serde_json::json!({ "role": self.config.role }),
                ),
                cancel,
            ),
            Err(error) => self.publish(
                Notification::error(
                    &self.config.role,
                    serde_json::json!({
                        "role": self.config.role,
                        "reason": error.to_string(),
                    }),
                ),
                cancel,
            ),
        }

        result
    }

    async fn execute(&self, request: Req, cancel: &CancelToken) -> Result<Resp, AgentError> {
        match self.strategy()? {
            Strategy::Deterministic => {
                let guard = self.deterministic.read();
                let executor = guard.as_ref().ok_or_else(|| AgentError::NoExecutionEngine {
                    role: self.config.role.clone(),
                })?;
                executor(&request)
            }
            Strategy::Generative(backend) => {
                if cancel.is_cancelled() {
                    return Err(AgentError::Cancelled {
                        reason: cancel.reason_or_default(),
                    });
                }

                let payload = serde_json::to_string_pretty(&request)
                    .map_err(|e| AgentError::Serialization(e.to_string()))?;

                let reply = tokio::select! {
                    () = cancel.cancelled() => {
                        return Err(AgentError::Cancelled {
                            reason: cancel.reason_or_default(),
                        });
                    }
                    result = backend.generate(
                        &self.config.instruction,
                        &payload,
                        &self.config.model,
                    ) => {
                        result.map_err(|e| AgentError::GenerativeCallFailed {
                            role: self.config.role.clone(),
                            reason: e.to_string(),
                        })?
                    }
                };

                decode_reply::<Resp>(&reply)
            }
        }
    }

    /// Resolves the execution strategy for one call: deterministic takes
    /// precedence, then the generative binding.
    fn strategy(&self) -> Result<Strategy, AgentError> {
        if self.has_deterministic() {
            return Ok(Strategy::Deterministic);
        }
        if let Some(backend) = &self.backend {
            return Ok(Strategy::Generative(backend.clone()));
        }
        Err(AgentError::NoExecutionEngine {
            role: self.config.role.clone(),
        })
    }

    /// Publishes a lifecycle notification, logging delivery failures
    /// instead of failing the invocation. Global listeners receive their
    /// copies even when the addressed sink is missing or full.
    fn publish(&self, notification: Notification, cancel: &CancelToken) {
        if let Err(error) = self.bus.send_with(&notification, Some(cancel)) {
            warn!(
                role = %self.config.role,
                kind = %notification.kind,
                %error,
                "lifecycle notification not delivered"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::NotificationKind;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Ping {
        value: u32,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Pong {
        value: u32,
    }

    fn config(role: &str) -> AgentConfig {
        AgentConfig::new(role, "test role", "You transform pings into pongs.", "test-model")
    }

    fn kinds(notifications: &[Notification]) -> Vec<NotificationKind> {
        notifications.iter().map(|n| n.kind.clone()).collect()
    }

    #[tokio::test]
    async fn test_deterministic_executor_runs() {
        let bus = Arc::new(EventBus::new());
        let agent: Agent<Ping, Pong> = Agent::new(config("echo"), bus, None)
            .with_deterministic(|req: &Ping| Ok(Pong { value: req.value }));

        let pong = agent
            .process(Ping { value: 7 }, &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(pong, Pong { value: 7 });
    }

    #[tokio::test]
    async fn test_deterministic_is_idempotent() {
        let bus = Arc::new(EventBus::new());
        let agent: Agent<Ping, Pong> = Agent::new(config("echo"), bus, None)
            .with_deterministic(|req: &Ping| Ok(Pong { value: req.value * 2 }));
        let cancel = CancelToken::new();

        let first = agent.process(Ping { value: 3 }, &cancel).await.unwrap();
        let second = agent.process(Ping { value: 3 }, &cancel).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_deterministic_takes_precedence_over_backend() {
        let bus = Arc::new(EventBus::new());
        let backend = Arc::new(ScriptedBackend::new(vec!["{\"value\": 99}".to_string()]));
        let agent: Agent<Ping, Pong> =
            Agent::new(config("echo"), bus, Some(backend.clone()))
                .with_deterministic(|req: &Ping| Ok(Pong { value: req.value }));

        let pong = agent
            .process(Ping { value: 1 }, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(pong.value, 1);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_execution_engine() {
        let bus = Arc::new(EventBus::new());
        let mut global = bus.subscribe_global();
        let agent: Agent<Ping, Pong> = Agent::new(config("idle"), bus, None);

        let err = agent
            .process(Ping { value: 0 }, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::NoExecutionEngine { role } if role == "idle"));

        assert_eq!(
            kinds(&global.drain()),
            vec![NotificationKind::Start, NotificationKind::Error]
        );
    }

    #[tokio::test]
    async fn test_generative_decodes_fenced_reply() {
        let bus = Arc::new(EventBus::new());
        let mut global = bus.subscribe_global();
        let backend = Arc::new(ScriptedBackend::new(vec![
            "```json\n{\"value\": 42}\n```".to_string(),
        ]));
        let agent: Agent<Ping, Pong> = Agent::new(config("gen"), bus, Some(backend));

        let pong = agent
            .process(Ping { value: 5 }, &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(pong.value, 42);

        assert_eq!(
            kinds(&global.drain()),
            vec![NotificationKind::Start, NotificationKind::Complete]
        );
    }

    #[tokio::test]
    async fn test_generative_decode_failure() {
        let bus = Arc::new(EventBus::new());
        let mut global = bus.subscribe_global();
        let backend = Arc::new(ScriptedBackend::new(vec!["not json".to_string()]));
        let agent: Agent<Ping, Pong> = Agent::new(config("gen"), bus, Some(backend));

        let err = agent
            .process(Ping { value: 5 }, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ResponseDecode { .. }));

        assert_eq!(
            kinds(&global.drain()),
            vec![NotificationKind::Start, NotificationKind::Error]
        );
    }

    #[tokio::test]
    async fn test_generative_empty_reply() {
        let bus = Arc::new(EventBus::new());
        let backend = Arc::new(ScriptedBackend::new(vec!["```json\n```".to_string()]));
        let agent: Agent<Ping, Pong> = Agent::new(config("gen"), bus, Some(backend));

        let err = agent
            .process(Ping { value: 5 }, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_as_generative_call_failed() {
        let bus = Arc::new(EventBus::new());
        let backend = Arc::new(ScriptedBackend::failing(BackendError::Rejected(
            "quota".to_string(),
        )));
        let agent: Agent<Ping, Pong> = Agent::new(config("gen"), bus, Some(backend));

        let err = agent
            .process(Ping { value: 5 }, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(
            matches!(err, AgentError::GenerativeCallFailed { ref reason, .. } if reason.contains("quota"))
        );
    }

    #[tokio::test]
    async fn test_cancellation_during_generative_call() {
        let bus = Arc::new(EventBus::new());
        let mut global = bus.subscribe_global();
        let backend = Arc::new(
            ScriptedBackend::new(vec!["{\"value\": 1}".to_string()])
                .with_latency(Duration::from_secs(30)),
        );
        let agent: Agent<Ping, Pong> = Agent::new(config("gen"), bus, Some(backend));

        let cancel = Arc::new(CancelToken::new());
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel("deadline reached");
        });

        let err = agent.process(Ping { value: 1 }, &cancel).await.unwrap_err();
        assert!(matches!(err, AgentError::Cancelled { reason } if reason == "deadline reached"));

        assert_eq!(
            kinds(&global.drain()),
            vec![NotificationKind::Start, NotificationKind::Error]
        );
    }

    #[tokio::test]
    async fn test_mocked_backend() {
        let bus = Arc::new(EventBus::new());
        let mut mock = MockGenerativeBackend::new();
        mock.expect_generate()
            .withf(|guidance, _request, model| {
                guidance.contains("pings into pongs") && model == "test-model"
            })
            .times(1)
            .returning(|_, _, _| Ok("{\"value\": 8}".to_string()));

        let agent: Agent<Ping, Pong> = Agent::new(config("gen"), bus, Some(Arc::new(mock)));
        let pong = agent
            .process(Ping { value: 8 }, &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(pong.value, 8);
    }
}
