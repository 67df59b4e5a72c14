//! Tool trait definition
//!
//! All tools implement this trait to provide a consistent interface.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::definition::{ToolDefinition, ToolInputSchema};

/// Result of running a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The output of the tool
    pub output: String,
    /// Whether the tool run resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            output: message.into(),
            is_error: true,
        }
    }
}

/// Information about a specific tool invocation
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool
    pub name: String,
    /// Human-readable description of what this invocation will do
    pub action_description: String,
    /// Additional details about the action
    pub details: Option<String>,
}

/// Trait for tools that agents can call
///
/// A tool that needs the run's shared state takes a `SharedStateRef` in its
/// constructor. `run` only receives the tool's declared input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of this tool
    fn name(&self) -> &str;

    /// Get a description of this tool
    fn description(&self) -> &str;

    /// JSON schema of the input object
    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::empty()
    }

    /// Get the full tool definition
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: self.input_schema(),
        }
    }

    /// Get information about what this tool invocation will do
    fn get_info(&self, _input: &Value) -> ToolInfo {
        ToolInfo {
            name: self.name().to_string(),
            action_description: format!("Run {}", self.name()),
            details: None,
        }
    }

    /// Run the tool with the given input
    ///
    /// Domain-level failures (bad input, missing prerequisite state) should be
    /// returned as `ToolResult::error`. `Err` is reserved for faults.
    async fn run(&self, input: &Value) -> Result<ToolResult>;
}
