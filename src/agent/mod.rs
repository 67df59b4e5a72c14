//! Agents
//!
//! - `Agent` trait - Decides the next step of a request and validates responses
//! - `ValidationOutcome` / `ResponseValidator` - Response validation hook types
//! - `ContextContainsValidator` - Checks responses against stored context
//! - `ScriptedAgent` - Agent that plays back fixed steps
//! - `AgentConfig` - Limits and hooks for a run
//! - `StandardLoop` / `ToolExecutor` - The request loop and tool dispatch

#[allow(clippy::module_inception)]
mod agent;
mod config;
mod executor;
mod scripted;
mod standard_loop;
mod validation;

pub use agent::{Agent, AgentResponse, AgentStep, AgentTurn, ToolCall, TurnEntry};
pub use config::{AgentConfig, DEFAULT_MAX_TOOL_ITERATIONS, DEFAULT_MAX_VALIDATION_ATTEMPTS};
pub use executor::ToolExecutor;
pub use scripted::ScriptedAgent;
pub use standard_loop::StandardLoop;
pub use validation::{
    ContextContainsValidator, ResponseValidator, ValidationOutcome, DEFAULT_CONTEXT_KEY,
};
