//! Framework error types

use thiserror::Error;

/// Errors that can occur while orchestrating a run
///
/// The shared state itself never produces these for plain `get`/`set`; they
/// come from typed conversions, tool dispatch and the agent loop.
#[derive(Error, Debug)]
pub enum FrameworkError {
    /// No tool registered under this name
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// No agent registered under this name
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// The agent failed to produce its next step
    #[error("Agent '{agent}' failed: {message}")]
    Agent { agent: String, message: String },

    /// The agent's responses kept failing its validation hook
    #[error("Response validation failed for agent '{agent}': {reason}")]
    ValidationFailed { agent: String, reason: String },

    /// The agent exceeded its tool call budget for one request
    #[error("Maximum tool iterations reached ({0})")]
    MaxToolIterations(usize),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FrameworkError {
    /// Create an agent failure
    pub fn agent(agent: impl Into<String>, message: impl Into<String>) -> Self {
        FrameworkError::Agent {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Check if this is a validation failure (recoverable by the caller)
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, FrameworkError::ValidationFailed { .. })
    }
}

/// Result type alias for framework operations
pub type FrameworkResult<T> = Result<T, FrameworkError>;
