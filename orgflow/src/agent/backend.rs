//! Generative backend contract.
//!
//! The pipeline treats the backend as an opaque remote call: given system
//! guidance and a serialized request, produce the full reply text or
//! fail. Retries, authentication, and provider selection belong to the
//! implementor.

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a generative backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The remote call could not be completed.
    #[error("backend transport failed: {0}")]
    Transport(String),

    /// The backend refused the request.
    #[error("backend rejected the request: {0}")]
    Rejected(String),
}

/// A backend that produces a response via a remote, potentially slow and
/// fallible call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Submits `serialized_request` under `system_guidance` to `model`
    /// and collects the full textual reply.
    async fn generate(
        &self,
        system_guidance: &str,
        serialized_request: &str,
        model: &str,
    ) -> Result<String, BackendError>;
}
