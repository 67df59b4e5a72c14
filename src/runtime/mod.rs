//! Run orchestration
//!
//! This module provides the infrastructure for running agents against a
//! shared state:
//! - `Orchestrator` - Holds tool and agent factories and starts runs
//! - `Run` - One execution; owns the state and the tools and agents built around it
//! - Channel types for streaming run events
//!
//! Each run gets its own `SharedState`. Tools and agents receive it at
//! construction, so every component of a run sees the same instance and
//! nothing crosses from one run to another.

pub mod channels;
mod orchestrator;
mod run;

pub use channels::{create_event_channel, create_event_channel_with_capacity, EventReceiver, EventSender};
pub use orchestrator::{AgentFactory, Orchestrator, ToolFactory};
pub use run::{Run, RunSummary};
