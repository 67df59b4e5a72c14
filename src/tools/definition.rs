//! Tool definitions
//!
//! Describes a tool's name, purpose and JSON input schema so an agent can
//! decide what to call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description of a tool as exposed to agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,

    /// Tool description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON schema for the tool input
    pub input_schema: ToolInputSchema,
}

/// JSON schema of a tool's input object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    /// Type (always "object")
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Properties of the input object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,

    /// Required properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ToolInputSchema {
    /// Schema for a tool that takes no input
    pub fn empty() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: None,
            required: None,
        }
    }

    /// Schema with the given properties and required keys
    pub fn object(properties: Value, required: &[&str]) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required.iter().map(|s| s.to_string()).collect())
            },
        }
    }
}

impl Default for ToolInputSchema {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_serialization() {
        let schema = ToolInputSchema::object(
            json!({ "key": { "type": "string" } }),
            &["key"],
        );
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["required"], json!(["key"]));
    }

    #[test]
    fn test_empty_schema_omits_fields() {
        let json = serde_json::to_value(ToolInputSchema::empty()).unwrap();
        assert_eq!(json, json!({ "type": "object" }));
    }
}
