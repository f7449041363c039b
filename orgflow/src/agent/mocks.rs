//! Scripted backend for tests and deterministic demo runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::backend::{BackendError, GenerativeBackend};

/// A generative backend that replays canned replies in order.
///
/// Once the script is exhausted, further calls fail with a transport
/// error. An optional per-call latency makes the backend usable in
/// cancellation tests.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<String>>,
    latency: Option<Duration>,
    failure: Option<BackendError>,
    call_count: AtomicUsize,
}

impl ScriptedBackend {
    /// Creates a backend that replays `replies` in order.
    #[must_use]
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            latency: None,
            failure: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Creates a backend that fails every call with `error`.
    #[must_use]
    pub fn failing(error: BackendError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            latency: None,
            failure: Some(error),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Adds a fixed latency before every reply.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns how many times `generate` was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(
        &self,
        _system_guidance: &str,
        _serialized_request: &str,
        _model: &str,
    ) -> Result<String, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| BackendError::Transport("script exhausted".to_string()))
    }
}
