//! Tool system for the framework
//!
//! This module provides:
//! - `Tool` trait - Interface for implementing tools
//! - `ToolResult` - Result type for tool runs
//! - `ToolDefinition` - Name, description and input schema of a tool
//! - `ToolRegistry` - Registry for the tools of one run
//! - `common` - Built-in shared state tools (SetState, GetState)

mod definition;
mod registry;
mod tool;

/// Common/built-in tools
pub mod common;

// Core exports
pub use definition::{ToolDefinition, ToolInputSchema};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolInfo, ToolResult};

// Re-export common tools for convenience
pub use common::{GetStateTool, SetStateTool};
