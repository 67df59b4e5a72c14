//! Run context - identity of the run and the agent currently acting in it

use std::fmt;

use chrono::{DateTime, Utc};

use super::state::{SharedState, SharedStateRef};

/// Context carried through one agent request inside a run
///
/// Hooks and the tool executor see this; tools themselves do not. Tools only
/// get the shared state injected at construction time.
#[derive(Clone)]
pub struct RunContext {
    /// Unique ID of the run
    pub run_id: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Name of the agent handling the current request
    pub agent_name: String,
    /// Sequence number of the current request within the run
    pub request: u64,

    /// Step counter within the current request (increments on each agent step)
    pub current_step: usize,

    /// ID of the tool call being executed, if any
    pub current_tool_use_id: Option<String>,

    state: SharedStateRef,
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("run_id", &self.run_id)
            .field("started_at", &self.started_at)
            .field("agent_name", &self.agent_name)
            .field("request", &self.request)
            .field("current_step", &self.current_step)
            .field("current_tool_use_id", &self.current_tool_use_id)
            .field("state", &self.state)
            .finish()
    }
}

impl RunContext {
    /// Create a context for `agent_name` acting in the given run
    pub fn new(
        run_id: impl Into<String>,
        started_at: DateTime<Utc>,
        agent_name: impl Into<String>,
        state: SharedStateRef,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            started_at,
            agent_name: agent_name.into(),
            request: 0,
            current_step: 0,
            current_tool_use_id: None,
            state,
        }
    }

    /// The run's shared state
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// A new reference to the run's shared state
    pub fn state_ref(&self) -> SharedStateRef {
        self.state.clone()
    }

    /// Set the request sequence number
    pub fn with_request(mut self, request: u64) -> Self {
        self.request = request;
        self
    }

    /// Increment the step counter
    pub fn next_step(&mut self) {
        self.current_step += 1;
    }

    /// Create a tool call ID unique within the run
    ///
    /// Format: `{agent}-{request}-{step}-{index}`.
    pub fn tool_use_id(&self, index: usize) -> String {
        format!(
            "{}-{}-{}-{}",
            self.agent_name, self.request, self.current_step, index
        )
    }

    /// Create a copy with the current tool_use_id set
    ///
    /// The copy shares the same state.
    pub fn with_tool_use_id(&self, tool_use_id: impl Into<String>) -> Self {
        let mut ctx = self.clone();
        ctx.current_tool_use_id = Some(tool_use_id.into());
        ctx
    }
}
