//! SetState tool
//!
//! Stores a value in the run's shared state so that later tools, or an
//! agent's validation hook, can read it back.
//!
//! Usage:
//! ```ignore
//! orchestrator.register_tool(SetStateTool::new);
//! ```

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::super::definition::ToolInputSchema;
use super::super::tool::{Tool, ToolInfo, ToolResult};
use crate::core::SharedStateRef;

/// Input for the SetState tool
#[derive(Debug, Deserialize)]
struct SetStateInput {
    key: String,
    value: Value,
}

/// Writes one key of the shared state
pub struct SetStateTool {
    state: SharedStateRef,
}

impl SetStateTool {
    /// Create a SetState tool bound to a run's state
    pub fn new(state: SharedStateRef) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Tool for SetStateTool {
    fn name(&self) -> &str {
        "SetState"
    }

    fn description(&self) -> &str {
        "Store a value under a key in the shared run state. \
        Overwrites any value previously stored under the same key."
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::object(
            json!({
                "key": {
                    "type": "string",
                    "minLength": 1,
                    "description": "The key to store the value under"
                },
                "value": {
                    "description": "The value to store (any JSON value)"
                }
            }),
            &["key", "value"],
        )
    }

    fn get_info(&self, input: &Value) -> ToolInfo {
        let key = input
            .get("key")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>");

        ToolInfo {
            name: self.name().to_string(),
            action_description: format!("Store shared state '{}'", key),
            details: None,
        }
    }

    async fn run(&self, input: &Value) -> Result<ToolResult> {
        let input: SetStateInput = match serde_json::from_value(input.clone()) {
            Ok(i) => i,
            Err(e) => return Ok(ToolResult::error(format!("Invalid SetState input: {}", e))),
        };

        if input.key.is_empty() {
            return Ok(ToolResult::error("SetState requires a non-empty key"));
        }

        self.state.set(input.key.as_str(), input.value);
        Ok(ToolResult::success(format!("Stored '{}'", input.key)))
    }
}
