//! Hook Types
//!
//! Core types for the hooks system:
//! - `HookEvent` - The type of hook event
//! - `HookContext` - Mutable context passed to hooks
//! - `HookResult` - Result returned from hooks
//! - `HookDecision` - Approve (skipping later hooks) or block

use serde_json::Value;

use crate::core::{RunContext, SharedState};
use crate::tools::ToolResult;

/// Hook event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// Before a tool runs - can block or rewrite input
    PreToolUse,
    /// After a tool returned a result
    PostToolUse,
    /// After a tool failed with an error
    PostToolUseFailure,
    /// After an agent response passed validation
    AgentResponse,
}

impl HookEvent {
    /// Whether hooks for this event are filtered by tool name
    pub fn is_tool_event(&self) -> bool {
        matches!(
            self,
            HookEvent::PreToolUse | HookEvent::PostToolUse | HookEvent::PostToolUseFailure
        )
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookEvent::PreToolUse => write!(f, "PreToolUse"),
            HookEvent::PostToolUse => write!(f, "PostToolUse"),
            HookEvent::PostToolUseFailure => write!(f, "PostToolUseFailure"),
            HookEvent::AgentResponse => write!(f, "AgentResponse"),
        }
    }
}

/// Mutable context passed to hooks
///
/// Hooks can read and write the run's shared state, and PreToolUse hooks
/// can rewrite `tool_input` before the tool sees it.
pub struct HookContext<'a> {
    /// The hook event type
    pub event: HookEvent,

    /// The run and agent this event belongs to
    pub run: &'a RunContext,

    // === Tool-specific (populated for tool hooks) ===
    /// Tool name being called
    pub tool_name: Option<String>,

    /// Tool input - can be modified by PreToolUse hooks
    pub tool_input: Option<Value>,

    /// Tool use ID
    pub tool_use_id: Option<String>,

    // === Results (for post hooks) ===
    /// Tool result (for PostToolUse)
    pub tool_result: Option<ToolResult>,

    /// Error message (for PostToolUseFailure)
    pub error: Option<String>,

    /// Accepted response (for AgentResponse)
    pub response: Option<String>,

    /// Stop at the first hook that blocks
    pub short_circuit_on_block: bool,
}

impl<'a> HookContext<'a> {
    fn base(event: HookEvent, run: &'a RunContext) -> Self {
        Self {
            event,
            run,
            tool_name: None,
            tool_input: None,
            tool_use_id: None,
            tool_result: None,
            error: None,
            response: None,
            short_circuit_on_block: false,
        }
    }

    /// Create context for PreToolUse hook
    pub fn pre_tool_use(
        run: &'a RunContext,
        tool_name: &str,
        tool_input: &Value,
        tool_use_id: &str,
    ) -> Self {
        Self {
            tool_name: Some(tool_name.to_string()),
            tool_input: Some(tool_input.clone()),
            tool_use_id: Some(tool_use_id.to_string()),
            ..Self::base(HookEvent::PreToolUse, run)
        }
    }

    /// Create context for PostToolUse hook
    pub fn post_tool_use(
        run: &'a RunContext,
        tool_name: &str,
        tool_input: &Value,
        tool_use_id: &str,
        result: &ToolResult,
    ) -> Self {
        Self {
            tool_name: Some(tool_name.to_string()),
            tool_input: Some(tool_input.clone()),
            tool_use_id: Some(tool_use_id.to_string()),
            tool_result: Some(result.clone()),
            ..Self::base(HookEvent::PostToolUse, run)
        }
    }

    /// Create context for PostToolUseFailure hook
    pub fn post_tool_use_failure(
        run: &'a RunContext,
        tool_name: &str,
        tool_input: &Value,
        tool_use_id: &str,
        error: &str,
    ) -> Self {
        Self {
            tool_name: Some(tool_name.to_string()),
            tool_input: Some(tool_input.clone()),
            tool_use_id: Some(tool_use_id.to_string()),
            error: Some(error.to_string()),
            ..Self::base(HookEvent::PostToolUseFailure, run)
        }
    }

    /// Create context for AgentResponse hook
    pub fn agent_response(run: &'a RunContext, response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            ..Self::base(HookEvent::AgentResponse, run)
        }
    }

    /// Stop running hooks after the first block
    pub fn with_short_circuit(mut self, enabled: bool) -> Self {
        self.short_circuit_on_block = enabled;
        self
    }

    // === Convenience methods ===

    /// The run's shared state
    pub fn state(&self) -> &SharedState {
        self.run.state()
    }

    /// Get run ID
    pub fn run_id(&self) -> &str {
        &self.run.run_id
    }

    /// Get the acting agent's name
    pub fn agent_name(&self) -> &str {
        &self.run.agent_name
    }
}

/// Decision returned by a hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    /// Approve the operation; hooks registered after this one are skipped
    Proceed,
    /// Block the tool call, returning an error result to the agent
    Block,
}

/// Result returned from a hook
///
/// Most hooks just return `HookResult::none()`. PreToolUse hooks that want to
/// stop a call return `HookResult::block(reason)`.
#[derive(Debug, Clone, Default)]
pub struct HookResult {
    /// Decision (`Block` only acted on for PreToolUse)
    pub decision: Option<HookDecision>,

    /// Reason for the decision (shown in the error result if blocked)
    pub reason: Option<String>,
}

impl HookResult {
    /// Approve the operation and skip the remaining hooks for this event
    pub fn proceed() -> Self {
        Self {
            decision: Some(HookDecision::Proceed),
            reason: None,
        }
    }

    /// Block the operation with a reason
    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            decision: Some(HookDecision::Block),
            reason: Some(reason.into()),
        }
    }

    /// No decision - continue with default behavior
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a reason to an existing result
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Check if this result blocks the operation
    pub fn is_blocked(&self) -> bool {
        self.decision == Some(HookDecision::Block)
    }
}
