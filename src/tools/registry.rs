//! Tool registry for managing available tools
//!
//! A run builds one registry from the orchestrator's tool factories, so every
//! tool in it shares the run's state.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use super::definition::ToolDefinition;
use super::tool::{Tool, ToolInfo, ToolResult};
use crate::core::{FrameworkError, FrameworkResult};

/// Registry that holds all available tools
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register an already shared tool, replacing any tool with the same name
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        tracing::info!("Registering tool: {}", name);
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!("[ToolRegistry] Replaced existing tool '{}'", name);
        }
    }

    /// Register a tool, failing if the name is already taken
    pub fn try_register_arc(&mut self, tool: Arc<dyn Tool>) -> FrameworkResult<()> {
        if self.tools.contains_key(tool.name()) {
            return Err(FrameworkError::InvalidConfig(format!(
                "Tool name conflict: '{}' already exists",
                tool.name()
            )));
        }
        self.register_arc(tool);
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Get information about a tool invocation
    pub fn get_tool_info(&self, name: &str, input: &Value) -> Option<ToolInfo> {
        self.tools.get(name).map(|t| t.get_info(input))
    }

    /// Run a tool by name
    pub async fn execute(&self, name: &str, input: &Value) -> Result<ToolResult> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| FrameworkError::ToolNotFound(name.to_string()))?;

        tracing::info!("Executing tool: {}", name);
        tracing::debug!("Input: {:?}", input);

        let result = tool.run(input).await?;

        tracing::debug!("Tool {} completed. Is error: {}", name, result.is_error);

        Ok(result)
    }

    /// Get the list of tool names
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}
