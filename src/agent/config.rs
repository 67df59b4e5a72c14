//! Agent Configuration
//!
//! Limits and hooks applied to every agent request in a run.

use std::sync::Arc;

use crate::core::{FrameworkError, FrameworkResult};
use crate::hooks::HookRegistry;

/// Default tool call budget per request
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 100;

/// Default number of responses an agent may produce per request
pub const DEFAULT_MAX_VALIDATION_ATTEMPTS: usize = 3;

/// Configuration shared by all agents of a run
///
/// Use the builder pattern to configure:
///
/// ```ignore
/// let config = AgentConfig::new()
///     .with_max_tool_iterations(20)
///     .with_max_validation_attempts(2)
///     .with_hooks(hooks);
/// ```
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum number of tool calls per request (prevents infinite loops)
    pub max_tool_iterations: usize,

    /// Maximum number of responses per request, including rejected ones
    pub max_validation_attempts: usize,

    /// Stop running PreToolUse hooks at the first block
    pub short_circuit_hooks: bool,

    /// Hooks for intercepting tool calls and responses
    pub hooks: Option<Arc<HookRegistry>>,
}

impl AgentConfig {
    /// Create a configuration with default limits and no hooks
    pub fn new() -> Self {
        Self {
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            max_validation_attempts: DEFAULT_MAX_VALIDATION_ATTEMPTS,
            short_circuit_hooks: false,
            hooks: None,
        }
    }

    /// Set maximum tool calls per request
    pub fn with_max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max;
        self
    }

    /// Set maximum responses per request
    pub fn with_max_validation_attempts(mut self, max: usize) -> Self {
        self.max_validation_attempts = max;
        self
    }

    /// Stop at the first blocking PreToolUse hook
    pub fn with_short_circuit_hooks(mut self, enabled: bool) -> Self {
        self.short_circuit_hooks = enabled;
        self
    }

    /// Set hooks
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = Some(Arc::new(hooks));
        self
    }

    /// Set already shared hooks
    pub fn with_hooks_arc(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Check that the limits allow an agent to ever respond
    pub fn validate(&self) -> FrameworkResult<()> {
        if self.max_validation_attempts == 0 {
            return Err(FrameworkError::InvalidConfig(
                "max_validation_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}
