//! Core types for the framework
//!
//! This module provides the fundamental types used throughout the framework:
//! - `SharedState` - Run-scoped key-value store shared by tools and agents
//! - `RunContext` - Identity of the run and the acting agent
//! - `RunEvent` - Events broadcast while a run executes
//! - `FrameworkError` - Error types

pub mod context;
pub mod error;
pub mod output;
pub mod state;

pub use context::RunContext;
pub use error::{FrameworkError, FrameworkResult};
pub use output::RunEvent;
pub use state::{SharedState, SharedStateRef, StateValue};
