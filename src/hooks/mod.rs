//! Hooks Module
//!
//! Intercept tool calls and agent responses inside a run.
//!
//! # Overview
//!
//! Hooks let you:
//! - Block tool calls based on what is already in the shared state
//! - Rewrite tool arguments before the tool sees them
//! - Record tool results or accepted responses into the shared state
//!
//! # Example
//!
//! ```ignore
//! use shadow_state_sdk::hooks::{HookRegistry, HookEvent, HookResult};
//!
//! let mut hooks = HookRegistry::new();
//!
//! // Remember the last accepted answer for later agents
//! hooks.add(HookEvent::AgentResponse, |ctx| {
//!     if let Some(text) = ctx.response.clone() {
//!         ctx.state().set("last_answer", text);
//!     }
//!     HookResult::none()
//! });
//!
//! let config = AgentConfig::new().with_hooks(hooks);
//! ```
//!
//! # Hook Events
//!
//! | Event | When | Can modify |
//! |-------|------|------------|
//! | `PreToolUse` | Before tool runs | `tool_input`, shared state, can block |
//! | `PostToolUse` | After tool returns | shared state |
//! | `PostToolUseFailure` | After tool fails | shared state |
//! | `AgentResponse` | After a response passes validation | shared state |
//!
//! A hook returning `HookResult::proceed()` approves the operation and the
//! hooks registered after it for the same event are skipped.

mod registry;
mod types;

pub use registry::{ArcHook, Hook, HookMatcher, HookRegistry};
pub use types::{HookContext, HookDecision, HookEvent, HookResult};
