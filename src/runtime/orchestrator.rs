//! Orchestrator - builds runs
//!
//! The orchestrator holds factories rather than instances. Each call to
//! `start_run` creates a fresh `SharedState` and builds every tool and agent
//! around it, so nothing leaks between runs.

use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::{Agent, AgentConfig};
use crate::core::{FrameworkError, FrameworkResult, SharedState, SharedStateRef};
use crate::tools::{Tool, ToolRegistry};

use super::channels::{create_event_channel_with_capacity, EVENT_CHANNEL_SIZE};
use super::run::Run;

/// Builds a tool for a run, given the run's state
pub type ToolFactory = Arc<dyn Fn(SharedStateRef) -> Arc<dyn Tool> + Send + Sync>;

/// Builds an agent for a run, given the run's state
pub type AgentFactory = Arc<dyn Fn(SharedStateRef) -> Arc<dyn Agent> + Send + Sync>;

/// Creates runs and injects each run's state into its tools and agents
///
/// # Example
///
/// ```ignore
/// let mut orchestrator = Orchestrator::new(AgentConfig::new());
/// orchestrator
///     .register_tool(SetStateTool::new)
///     .register_tool(GetStateTool::new)
///     .register_agent(|state| {
///         ScriptedAgent::new("geo")
///             .then_respond("Paris")
///             .with_validator(ContextContainsValidator::for_context(state))
///     });
///
/// let run = orchestrator.start_run()?;
/// let response = run.execute("geo", "What is the capital of France?").await?;
/// let summary = run.finish();
/// ```
pub struct Orchestrator {
    config: Arc<AgentConfig>,
    tool_factories: Vec<ToolFactory>,
    agent_factories: Vec<AgentFactory>,
    event_capacity: usize,
}

impl Orchestrator {
    /// Create an orchestrator with the given agent configuration
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config: Arc::new(config),
            tool_factories: Vec::new(),
            agent_factories: Vec::new(),
            event_capacity: EVENT_CHANNEL_SIZE,
        }
    }

    /// Set the buffer size of each run's event channel
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// The agent configuration shared by all runs
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Register a tool factory
    ///
    /// Constructors that take the state directly work as factories:
    /// `orchestrator.register_tool(GetStateTool::new)`.
    pub fn register_tool<F, T>(&mut self, factory: F) -> &mut Self
    where
        F: Fn(SharedStateRef) -> T + Send + Sync + 'static,
        T: Tool + 'static,
    {
        self.tool_factories
            .push(Arc::new(move |state| Arc::new(factory(state)) as Arc<dyn Tool>));
        self
    }

    /// Register an agent factory
    pub fn register_agent<F, A>(&mut self, factory: F) -> &mut Self
    where
        F: Fn(SharedStateRef) -> A + Send + Sync + 'static,
        A: Agent + 'static,
    {
        self.agent_factories
            .push(Arc::new(move |state| Arc::new(factory(state)) as Arc<dyn Agent>));
        self
    }

    /// Number of registered tool factories
    pub fn tool_count(&self) -> usize {
        self.tool_factories.len()
    }

    /// Number of registered agent factories
    pub fn agent_count(&self) -> usize {
        self.agent_factories.len()
    }

    /// Start a run with a fresh, empty state
    pub fn start_run(&self) -> FrameworkResult<Run> {
        self.start_run_with_state(SharedState::shared())
    }

    /// Start a run around an existing state
    ///
    /// This is the only way state outlives a run; the caller opts into it by
    /// keeping the state from a previous run (see `Run::into_state`).
    pub fn start_run_with_state(&self, state: SharedStateRef) -> FrameworkResult<Run> {
        self.config.validate()?;

        let mut tools = ToolRegistry::new();
        for factory in &self.tool_factories {
            tools.try_register_arc(factory(state.clone()))?;
        }

        let mut agents: HashMap<String, Arc<dyn Agent>> = HashMap::new();
        for factory in &self.agent_factories {
            let agent = factory(state.clone());
            let name = agent.name().to_string();
            if agents.contains_key(&name) {
                return Err(FrameworkError::InvalidConfig(format!(
                    "Agent name conflict: '{}' already exists",
                    name
                )));
            }
            agents.insert(name, agent);
        }

        let events = create_event_channel_with_capacity(self.event_capacity);
        Ok(Run::new(state, tools, agents, self.config.clone(), events))
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(AgentConfig::default())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("tools", &self.tool_factories.len())
            .field("agents", &self.agent_factories.len())
            .finish()
    }
}
