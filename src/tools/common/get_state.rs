//! GetState tool
//!
//! Reads a value from the run's shared state. When the key has not been
//! stored yet, the tool answers with a message telling the agent to run the
//! producing step first instead of failing.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::super::definition::ToolInputSchema;
use super::super::tool::{Tool, ToolInfo, ToolResult};
use crate::core::SharedStateRef;

#[derive(Debug, Deserialize)]
struct GetStateInput {
    key: String,
}

/// Reads one key of the shared state
pub struct GetStateTool {
    state: SharedStateRef,
}

impl GetStateTool {
    /// Create a GetState tool bound to a run's state
    pub fn new(state: SharedStateRef) -> Self {
        Self { state }
    }
}

/// Message returned when a key was read before anything stored it
pub fn missing_key_message(key: &str) -> String {
    format!(
        "No value stored under '{}'. Run the step that produces it first.",
        key
    )
}

#[async_trait]
impl Tool for GetStateTool {
    fn name(&self) -> &str {
        "GetState"
    }

    fn description(&self) -> &str {
        "Read the value stored under a key in the shared run state."
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::object(
            json!({
                "key": {
                    "type": "string",
                    "description": "The key to read"
                }
            }),
            &["key"],
        )
    }

    fn get_info(&self, input: &Value) -> ToolInfo {
        let key = input
            .get("key")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>");

        ToolInfo {
            name: self.name().to_string(),
            action_description: format!("Read shared state '{}'", key),
            details: None,
        }
    }

    async fn run(&self, input: &Value) -> Result<ToolResult> {
        let input: GetStateInput = match serde_json::from_value(input.clone()) {
            Ok(i) => i,
            Err(e) => return Ok(ToolResult::error(format!("Invalid GetState input: {}", e))),
        };

        let output = match self.state.get(&input.key) {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => {
                tracing::debug!("[GetState] '{}' not set yet", input.key);
                return Ok(ToolResult::error(missing_key_message(&input.key)));
            }
        };

        Ok(ToolResult::success(output))
    }
}
