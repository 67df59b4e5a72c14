//! Agent trait and the types an agent works with during a request

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::ValidationOutcome;
use crate::tools::{ToolDefinition, ToolResult};

/// A request to run one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to run
    pub name: String,
    /// Input matching the tool's schema
    pub input: Value,
}

impl ToolCall {
    /// Create a tool call
    pub fn new(name: impl Into<String>, input: Value) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }
}

/// What an agent decides to do next
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    /// Run a single tool
    CallTool(ToolCall),
    /// Run several tools concurrently
    CallTools(Vec<ToolCall>),
    /// Finish the request with a response (subject to validation)
    Respond(String),
}

impl AgentStep {
    /// Shorthand for a single tool call
    pub fn call(name: impl Into<String>, input: Value) -> Self {
        AgentStep::CallTool(ToolCall::new(name, input))
    }

    /// Shorthand for a response
    pub fn respond(text: impl Into<String>) -> Self {
        AgentStep::Respond(text.into())
    }
}

/// One entry of the request transcript
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEntry {
    /// A tool call and its result
    Tool {
        /// Tool use ID
        id: String,
        /// The call as requested
        call: ToolCall,
        /// What the tool returned
        result: ToolResult,
    },
    /// A response that failed validation
    Rejected {
        /// The rejected response
        response: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Everything an agent sees when deciding its next step
#[derive(Debug, Clone)]
pub struct AgentTurn {
    /// ID of the run this request belongs to
    pub run_id: String,
    /// The request prompt
    pub prompt: String,
    /// Number of steps already taken in this request
    pub step: usize,
    /// Tools available in the run
    pub tools: Vec<ToolDefinition>,
    /// Tool results and rejected responses so far
    pub transcript: Vec<TurnEntry>,
}

impl AgentTurn {
    /// Create the first turn of a request
    pub fn new(run_id: impl Into<String>, prompt: impl Into<String>, tools: Vec<ToolDefinition>) -> Self {
        Self {
            run_id: run_id.into(),
            prompt: prompt.into(),
            step: 0,
            tools,
            transcript: Vec::new(),
        }
    }

    /// Result of the most recent tool call
    pub fn last_tool_result(&self) -> Option<&ToolResult> {
        self.transcript.iter().rev().find_map(|entry| match entry {
            TurnEntry::Tool { result, .. } => Some(result),
            TurnEntry::Rejected { .. } => None,
        })
    }

    /// Reason the most recent response was rejected, if any
    pub fn last_rejection(&self) -> Option<&str> {
        self.transcript.iter().rev().find_map(|entry| match entry {
            TurnEntry::Rejected { reason, .. } => Some(reason.as_str()),
            TurnEntry::Tool { .. } => None,
        })
    }

    /// Number of responses rejected so far
    pub fn rejection_count(&self) -> usize {
        self.transcript
            .iter()
            .filter(|e| matches!(e, TurnEntry::Rejected { .. }))
            .count()
    }

    /// Check if a tool is available in this run
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }
}

/// Final, validated answer of an agent to a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Agent that answered
    pub agent: String,
    /// The accepted response text
    pub text: String,
    /// Tool calls made while answering
    pub tool_calls: usize,
    /// Responses produced, including rejected ones
    pub attempts: usize,
}

/// Trait for agents that take part in a run
///
/// An agent that needs the shared state takes a `SharedStateRef` in its
/// constructor, the same way tools do.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Name of the agent, unique within a run
    fn name(&self) -> &str;

    /// What this agent does
    fn description(&self) -> &str {
        ""
    }

    /// Decide the next step for the current request
    async fn next_step(&self, turn: &AgentTurn) -> Result<AgentStep>;

    /// Check a response before it is returned
    ///
    /// Returning `ValidationOutcome::Invalid` sends the reason back to the
    /// agent and asks it for another step.
    fn validate_response(&self, _response: &str) -> ValidationOutcome {
        ValidationOutcome::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn turn_with(entries: Vec<TurnEntry>) -> AgentTurn {
        let mut turn = AgentTurn::new("run", "prompt", Vec::new());
        turn.transcript = entries;
        turn
    }

    #[test]
    fn test_step_shorthands() {
        assert_eq!(
            AgentStep::call("GetState", json!({"key": "k"})),
            AgentStep::CallTool(ToolCall::new("GetState", json!({"key": "k"})))
        );
        assert_eq!(AgentStep::respond("done"), AgentStep::Respond("done".into()));
    }

    #[test]
    fn test_transcript_queries() {
        let turn = turn_with(vec![
            TurnEntry::Tool {
                id: "a-0-0".into(),
                call: ToolCall::new("GetState", json!({})),
                result: ToolResult::success("first"),
            },
            TurnEntry::Rejected {
                response: "Berlin".into(),
                reason: "not in context".into(),
            },
            TurnEntry::Tool {
                id: "a-2-0".into(),
                call: ToolCall::new("GetState", json!({})),
                result: ToolResult::success("second"),
            },
        ]);

        assert_eq!(turn.last_tool_result().map(|r| r.output.as_str()), Some("second"));
        assert_eq!(turn.last_rejection(), Some("not in context"));
        assert_eq!(turn.rejection_count(), 1);
    }

    #[test]
    fn test_empty_transcript() {
        let turn = turn_with(Vec::new());
        assert!(turn.last_tool_result().is_none());
        assert!(turn.last_rejection().is_none());
        assert!(!turn.has_tool("GetState"));
    }
}
