//! Run - one orchestrated execution and the state it owns
//!
//! A `Run` is created by the `Orchestrator`. It owns the shared state for
//! its whole lifetime along with the tools and agents built around that state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentConfig, AgentResponse, StandardLoop};
use crate::core::{FrameworkError, FrameworkResult, RunContext, RunEvent, SharedStateRef};
use crate::tools::ToolRegistry;

use super::channels::{emit, EventReceiver, EventSender};

/// What a finished run reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run ID
    pub run_id: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Number of entries in the shared state when it was discarded
    pub state_entries: usize,
}

impl RunSummary {
    /// Wall-clock duration of the run in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// One orchestrated execution
///
/// `execute` takes `&self`, so several agents of the same run can work
/// concurrently against the same state.
pub struct Run {
    id: String,
    started_at: DateTime<Utc>,
    state: SharedStateRef,
    tools: ToolRegistry,
    agents: HashMap<String, Arc<dyn Agent>>,
    config: Arc<AgentConfig>,
    events: EventSender,
    requests: AtomicU64,
}

impl Run {
    pub(crate) fn new(
        state: SharedStateRef,
        tools: ToolRegistry,
        agents: HashMap<String, Arc<dyn Agent>>,
        config: Arc<AgentConfig>,
        events: EventSender,
    ) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            "[Run] Started run {} ({} tools, {} agents)",
            id,
            tools.len(),
            agents.len()
        );
        Self {
            id,
            started_at: Utc::now(),
            state,
            tools,
            agents,
            config,
            events,
            requests: AtomicU64::new(0),
        }
    }

    /// Run ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the run started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The run's shared state
    pub fn state(&self) -> &SharedStateRef {
        &self.state
    }

    /// The tools built for this run
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Names of the agents in this run, sorted
    pub fn agent_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.agents.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get an agent by name
    pub fn agent(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    /// Subscribe to this run's events
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Have `agent_name` handle `prompt`
    ///
    /// Returns the validated response, or `ValidationFailed` if the agent ran
    /// out of attempts. How to react to a validation failure is up to the
    /// caller.
    pub async fn execute(&self, agent_name: &str, prompt: &str) -> FrameworkResult<AgentResponse> {
        let agent = self
            .agents
            .get(agent_name)
            .ok_or_else(|| FrameworkError::AgentNotFound(agent_name.to_string()))?;

        let request = self.requests.fetch_add(1, Ordering::Relaxed);
        let ctx = RunContext::new(
            self.id.clone(),
            self.started_at,
            agent_name,
            self.state.clone(),
        )
        .with_request(request);

        StandardLoop::new(&self.config, &self.tools, &self.events)
            .run(agent.as_ref(), ctx, prompt)
            .await
    }

    /// End the run, discarding its state
    ///
    /// Tools and agents built for the run are dropped with it.
    pub fn finish(self) -> RunSummary {
        self.close(false)
    }

    /// End the run but keep its state for explicit reuse
    pub fn into_state(self) -> (RunSummary, SharedStateRef) {
        let summary = self.close(true);
        (summary, self.state.clone())
    }

    fn close(&self, state_kept: bool) -> RunSummary {
        let summary = RunSummary {
            run_id: self.id.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            state_entries: self.state.len(),
        };

        emit(
            &self.events,
            RunEvent::RunFinished {
                run_id: self.id.clone(),
                state_kept,
            },
        );
        tracing::info!(
            "[Run] Finished run {} after {} ms (state kept: {})",
            summary.run_id,
            summary.duration_ms(),
            state_kept
        );

        summary
    }
}

impl std::fmt::Debug for Run {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Run")
            .field("id", &self.id)
            .field("started_at", &self.started_at)
            .field("state", &self.state)
            .field("tools", &self.tools)
            .field("agents", &self.agent_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{ContextContainsValidator, ScriptedAgent};
    use crate::runtime::Orchestrator;
    use crate::tools::common::missing_key_message;
    use crate::tools::{GetStateTool, SetStateTool};
    use serde_json::json;
    use std::sync::Weak;

    fn geography_orchestrator() -> Orchestrator {
        geography_orchestrator_with(AgentConfig::new())
    }

    fn geography_orchestrator_with(config: AgentConfig) -> Orchestrator {
        let mut orchestrator = Orchestrator::new(config);
        orchestrator
            .register_tool(SetStateTool::new)
            .register_tool(GetStateTool::new)
            .register_agent(|_state| {
                ScriptedAgent::new("researcher")
                    .then_call(
                        "SetState",
                        json!({"key": "context", "value": "Paris is the capital of France"}),
                    )
                    .then_respond("stored")
            })
            .register_agent(|state| {
                ScriptedAgent::new("answerer")
                    .then_call("GetState", json!({"key": "context"}))
                    .then_respond("Paris")
                    .with_validator(ContextContainsValidator::for_context(state))
            });
        orchestrator
    }

    #[tokio::test]
    async fn test_agents_share_state_through_tools() {
        let run = geography_orchestrator().start_run().unwrap();
        assert!(run.state().get("context").is_none());

        run.execute("researcher", "find the capital").await.unwrap();
        let response = run.execute("answerer", "what is the capital?").await.unwrap();

        assert_eq!(response.text, "Paris");
        assert_eq!(
            run.state().get_str("context").as_deref(),
            Some("Paris is the capital of France")
        );
    }

    #[tokio::test]
    async fn test_answer_before_prerequisite_fails_validation() {
        let config = AgentConfig::new().with_max_validation_attempts(1);
        let run = geography_orchestrator_with(config).start_run().unwrap();
        let mut rx = run.subscribe();

        let err = run.execute("answerer", "what is the capital?").await.unwrap_err();
        assert!(err.is_validation_failure());

        // The GetState call reported the missing prerequisite instead of failing
        assert!(matches!(rx.recv().await.unwrap(), RunEvent::ToolStart { .. }));
        match rx.recv().await.unwrap() {
            RunEvent::ToolEnd { result, .. } => {
                assert!(result.is_error);
                assert_eq!(result.output, missing_key_message("context"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let run = geography_orchestrator().start_run().unwrap();
        let err = run.execute("nobody", "hi").await.unwrap_err();
        assert!(matches!(err, FrameworkError::AgentNotFound(name) if name == "nobody"));
        assert_eq!(run.agent_names(), vec!["answerer", "researcher"]);
    }

    #[tokio::test]
    async fn test_runs_are_isolated() {
        let orchestrator = geography_orchestrator();
        let first = orchestrator.start_run().unwrap();
        let second = orchestrator.start_run().unwrap();

        first.execute("researcher", "store").await.unwrap();

        assert!(first.state().contains("context"));
        assert!(!second.state().contains("context"));
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_finish_discards_state() {
        let run = geography_orchestrator().start_run().unwrap();
        run.execute("researcher", "store").await.unwrap();

        let weak: Weak<_> = Arc::downgrade(run.state());
        let mut rx = run.subscribe();
        let run_id = run.id().to_string();

        let summary = run.finish();
        assert_eq!(summary.run_id, run_id);
        assert_eq!(summary.state_entries, 1);
        assert!(summary.duration_ms() >= 0);
        assert!(weak.upgrade().is_none());
        assert!(matches!(
            rx.recv().await.unwrap(),
            RunEvent::RunFinished { run_id: id, state_kept: false } if id == run_id
        ));
    }

    #[tokio::test]
    async fn test_into_state_allows_reuse() {
        let orchestrator = geography_orchestrator();
        let run = orchestrator.start_run().unwrap();
        run.execute("researcher", "store").await.unwrap();
        let mut rx = run.subscribe();

        let (summary, state) = run.into_state();
        assert_eq!(summary.state_entries, 1);
        assert!(matches!(
            rx.recv().await.unwrap(),
            RunEvent::RunFinished { state_kept: true, .. }
        ));

        let next = orchestrator.start_run_with_state(state).unwrap();
        let response = next.execute("answerer", "capital?").await.unwrap();
        assert_eq!(response.text, "Paris");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_agent_concurrently_gets_distinct_tool_ids() {
        let mut orchestrator = Orchestrator::new(AgentConfig::new());
        orchestrator
            .register_tool(GetStateTool::new)
            .register_agent(|_state| {
                ScriptedAgent::new("w")
                    .then_call("GetState", json!({"key": "anything"}))
                    .then_respond("done")
            });
        let run = Arc::new(orchestrator.start_run().unwrap());
        let mut rx = run.subscribe();

        let first = {
            let run = run.clone();
            tokio::spawn(async move { run.execute("w", "one").await })
        };
        let second = {
            let run = run.clone();
            tokio::spawn(async move { run.execute("w", "two").await })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let mut ids = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let RunEvent::ToolEnd { id, .. } = event {
                ids.push(id);
            }
        }
        ids.sort();
        assert_eq!(ids, vec!["w-0-0-0".to_string(), "w-1-0-0".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_agents_on_one_run() {
        let mut orchestrator = Orchestrator::new(AgentConfig::new());
        orchestrator.register_tool(SetStateTool::new);
        for i in 0..8 {
            orchestrator.register_agent(move |_state| {
                ScriptedAgent::new(format!("writer-{}", i))
                    .then_call("SetState", json!({"key": "winner", "value": i}))
                    .then_call("SetState", json!({"key": format!("own-{}", i), "value": i}))
                    .then_respond("done")
            });
        }
        let run = Arc::new(orchestrator.start_run().unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let run = run.clone();
                tokio::spawn(async move { run.execute(&format!("writer-{}", i), "write").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let winner = run.state().get("winner").and_then(|v| v.as_u64()).unwrap();
        assert!(winner < 8);
        for i in 0..8u64 {
            assert_eq!(run.state().get(&format!("own-{}", i)), Some(json!(i)));
        }
    }
}
