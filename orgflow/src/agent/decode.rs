//! Best-effort extraction of a structured payload from a free-form reply.
//!
//! Generative backends frequently wrap structured replies in Markdown
//! code fences. The envelope handling lives here, behind the generative
//! execution path, so the decode contract stays independent of any one
//! backend's reply format.

use serde::de::DeserializeOwned;

use crate::errors::AgentError;

/// Removes Markdown code-fence decoration from around the reply body.
///
/// Handles ```` ```json ````, bare ```` ``` ````, and a missing closing
/// fence on truncated replies. Input without fences is returned trimmed.
#[must_use]
pub fn strip_code_fences(input: &str) -> String {
    let trimmed = input.trim();

    let after_open = if let Some(stripped) = trimmed.strip_prefix("```json") {
        stripped
    } else if let Some(stripped) = trimmed.strip_prefix("```") {
        stripped
    } else {
        return trimmed.to_string();
    };

    let after_open = after_open.strip_prefix('\n').unwrap_or(after_open);

    let before_close = if let Some(stripped) = after_open.trim_end().strip_suffix("```") {
        stripped.trim_end()
    } else {
        after_open
    };

    before_close.to_string()
}

/// Decodes a raw backend reply into the declared response type.
///
/// An empty reply after cleanup fails with [`AgentError::EmptyResponse`];
/// a parse failure fails with [`AgentError::ResponseDecode`] carrying
/// both the raw and the cleaned text for diagnosis.
pub fn decode_reply<T: DeserializeOwned>(raw: &str) -> Result<T, AgentError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.trim().is_empty() {
        return Err(AgentError::EmptyResponse);
    }

    serde_json::from_str(&cleaned).map_err(|source| AgentError::ResponseDecode {
        raw: raw.to_string(),
        cleaned,
        source,
    })
}
