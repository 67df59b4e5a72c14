//! Events broadcast while a run is executing

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolResult;

/// Events streamed FROM a run to its subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    // --- Tool Execution ---
    /// Tool execution starting
    ToolStart {
        /// Agent that requested the call
        agent: String,
        /// Tool use ID
        id: String,
        /// Tool name
        name: String,
        /// Tool input (after hooks)
        input: Value,
    },

    /// Tool execution completed
    ToolEnd {
        /// Agent that requested the call
        agent: String,
        /// Tool use ID
        id: String,
        /// Tool name
        name: String,
        /// Tool result
        result: ToolResult,
    },

    // --- Responses ---
    /// A response failed the agent's validation hook
    ResponseRejected {
        /// Agent that produced the response
        agent: String,
        /// The rejected response
        response: String,
        /// Why validation failed
        reason: String,
    },

    /// A response passed validation and was returned
    Response {
        /// Agent that produced the response
        agent: String,
        /// The accepted response
        text: String,
    },

    // --- Lifecycle ---
    /// The run finished
    RunFinished {
        /// Run ID
        run_id: String,
        /// Whether the state was handed back for reuse instead of discarded
        state_kept: bool,
    },
}

impl RunEvent {
    /// Name of the agent this event belongs to, if any
    pub fn agent(&self) -> Option<&str> {
        match self {
            RunEvent::ToolStart { agent, .. }
            | RunEvent::ToolEnd { agent, .. }
            | RunEvent::ResponseRejected { agent, .. }
            | RunEvent::Response { agent, .. } => Some(agent),
            RunEvent::RunFinished { .. } => None,
        }
    }
}
