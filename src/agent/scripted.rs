//! Scripted agent
//!
//! An agent that plays back a fixed list of steps. Useful for wiring up a run
//! without a model behind it, and for tests.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::agent::{Agent, AgentStep, AgentTurn, ToolCall};
use super::validation::{ResponseValidator, ValidationOutcome};

/// Agent that returns its scripted steps in order
///
/// Step `n` of a request is the `n`-th scripted step, so a response that
/// fails validation moves on to the next scripted step.
///
/// ```ignore
/// let agent = ScriptedAgent::new("geo")
///     .then_call("GetState", json!({"key": "context"}))
///     .then_respond("Paris")
///     .with_validator(ContextContainsValidator::for_context(state));
/// ```
#[derive(Clone)]
pub struct ScriptedAgent {
    name: String,
    description: String,
    steps: Vec<AgentStep>,
    validator: Option<Arc<dyn ResponseValidator>>,
}

impl ScriptedAgent {
    /// Create an agent with an empty script
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            steps: Vec::new(),
            validator: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a step
    pub fn then(mut self, step: AgentStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a single tool call
    pub fn then_call(self, tool: impl Into<String>, input: Value) -> Self {
        self.then(AgentStep::call(tool, input))
    }

    /// Append a batch of concurrent tool calls
    pub fn then_call_all(self, calls: Vec<ToolCall>) -> Self {
        self.then(AgentStep::CallTools(calls))
    }

    /// Append a response
    pub fn then_respond(self, text: impl Into<String>) -> Self {
        self.then(AgentStep::respond(text))
    }

    /// Validate responses with `validator`
    pub fn with_validator<V: ResponseValidator + 'static>(mut self, validator: V) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Number of scripted steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the script is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn next_step(&self, turn: &AgentTurn) -> Result<AgentStep> {
        self.steps
            .get(turn.step)
            .cloned()
            .ok_or_else(|| anyhow!("script has no step {} ({} scripted)", turn.step, self.steps.len()))
    }

    fn validate_response(&self, response: &str) -> ValidationOutcome {
        match &self.validator {
            Some(v) => v.validate(response),
            None => ValidationOutcome::Valid,
        }
    }
}

impl std::fmt::Debug for ScriptedAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedAgent")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}
