//! Run-scoped shared state for tools and agents
//!
//! Tools and agents of one run exchange intermediate results through a
//! `SharedState` injected at construction. Agents can refuse to return a
//! response that is not grounded in that state.

pub mod core;
pub mod runtime;
pub mod tools;

// Optional components
pub mod logging;

// Standardized agent implementation
pub mod agent;

// Hooks for intercepting agent behavior
pub mod hooks;
