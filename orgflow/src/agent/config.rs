//! Per-role agent configuration.

use serde::{Deserialize, Serialize};

/// Semantic configuration bound to one agent at construction.
///
/// Resolution of API credentials from the model identifier happens before
/// construction and is not this crate's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// The agent's role name, used as its publishing identity.
    pub role: String,
    /// Human-readable description of the role.
    pub description: String,
    /// Instruction text submitted as system guidance on generative calls.
    pub instruction: String,
    /// Declared model identifier handed to the generative backend.
    pub model: String,
}

impl AgentConfig {
    /// Creates a new agent configuration.
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        description: impl Into<String>,
        instruction: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            description: description.into(),
            instruction: instruction.into(),
            model: model.into(),
        }
    }
}
