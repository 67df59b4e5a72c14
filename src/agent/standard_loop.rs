//! Standard Agent Loop
//!
//! Drives one agent through one request:
//! - Ask the agent for its next step
//! - Run requested tools (concurrently when batched)
//! - Validate responses, feeding rejections back to the agent
//! - Enforce the tool and validation budgets

use futures::future::join_all;

use crate::core::{FrameworkError, FrameworkResult, RunContext, RunEvent};
use crate::hooks::HookContext;
use crate::runtime::channels::{emit, EventSender};
use crate::tools::ToolRegistry;

use super::agent::{Agent, AgentResponse, AgentStep, AgentTurn, ToolCall, TurnEntry};
use super::config::AgentConfig;
use super::executor::ToolExecutor;
use super::validation::ValidationOutcome;

/// Runs the step loop for a single agent request
///
/// # Example
///
/// ```ignore
/// let agent_loop = StandardLoop::new(&config, &tools, &events);
/// let response = agent_loop.run(agent.as_ref(), ctx, "What is the capital?").await?;
/// ```
pub struct StandardLoop<'a> {
    config: &'a AgentConfig,
    tools: &'a ToolRegistry,
    events: &'a EventSender,
}

impl<'a> StandardLoop<'a> {
    /// Create a loop over the given run resources
    pub fn new(config: &'a AgentConfig, tools: &'a ToolRegistry, events: &'a EventSender) -> Self {
        Self {
            config,
            tools,
            events,
        }
    }

    /// Run the agent until it produces a valid response or a budget runs out
    pub async fn run(
        &self,
        agent: &dyn Agent,
        mut ctx: RunContext,
        prompt: &str,
    ) -> FrameworkResult<AgentResponse> {
        let agent_name = agent.name().to_string();
        tracing::info!("[StandardLoop] Agent '{}' handling request", agent_name);

        let mut turn = AgentTurn::new(ctx.run_id.clone(), prompt, self.tools.definitions());
        let mut tool_calls = 0usize;
        let mut attempts = 0usize;

        loop {
            let step = agent
                .next_step(&turn)
                .await
                .map_err(|e| FrameworkError::agent(&agent_name, e.to_string()))?;

            match step {
                AgentStep::CallTool(call) => {
                    tool_calls = self.check_tool_budget(tool_calls, 1)?;
                    let entries = self.run_tools(&ctx, vec![call]).await;
                    turn.transcript.extend(entries);
                }

                AgentStep::CallTools(calls) => {
                    if calls.is_empty() {
                        return Err(FrameworkError::agent(
                            &agent_name,
                            "requested an empty batch of tool calls",
                        ));
                    }
                    tool_calls = self.check_tool_budget(tool_calls, calls.len())?;
                    let entries = self.run_tools(&ctx, calls).await;
                    turn.transcript.extend(entries);
                }

                AgentStep::Respond(text) => {
                    attempts += 1;

                    match agent.validate_response(&text) {
                        ValidationOutcome::Valid => {
                            tracing::info!(
                                "[StandardLoop] Agent '{}' responded after {} tool call(s)",
                                agent_name,
                                tool_calls
                            );
                            self.accept(&ctx, &agent_name, &text);
                            return Ok(AgentResponse {
                                agent: agent_name,
                                text,
                                tool_calls,
                                attempts,
                            });
                        }

                        ValidationOutcome::Invalid { reason } => {
                            tracing::warn!(
                                "[StandardLoop] Response from '{}' rejected (attempt {}/{}): {}",
                                agent_name,
                                attempts,
                                self.config.max_validation_attempts,
                                reason
                            );
                            emit(
                                self.events,
                                RunEvent::ResponseRejected {
                                    agent: agent_name.clone(),
                                    response: text.clone(),
                                    reason: reason.clone(),
                                },
                            );

                            if attempts >= self.config.max_validation_attempts {
                                return Err(FrameworkError::ValidationFailed {
                                    agent: agent_name,
                                    reason,
                                });
                            }

                            turn.transcript.push(TurnEntry::Rejected {
                                response: text,
                                reason,
                            });
                        }
                    }
                }
            }

            turn.step += 1;
            ctx.next_step();
        }
    }

    /// Add `requested` calls to `used`, failing if that exceeds the budget
    fn check_tool_budget(&self, used: usize, requested: usize) -> FrameworkResult<usize> {
        let total = used + requested;
        if total > self.config.max_tool_iterations {
            tracing::warn!(
                "[StandardLoop] Tool budget exhausted ({} requested, {} allowed)",
                total,
                self.config.max_tool_iterations
            );
            return Err(FrameworkError::MaxToolIterations(
                self.config.max_tool_iterations,
            ));
        }
        Ok(total)
    }

    /// Run a batch of tool calls concurrently, keeping request order
    async fn run_tools(&self, ctx: &RunContext, calls: Vec<ToolCall>) -> Vec<TurnEntry> {
        let hooks = self.config.hooks.as_deref();
        let contexts: Vec<RunContext> = (0..calls.len())
            .map(|i| ctx.with_tool_use_id(ctx.tool_use_id(i)))
            .collect();

        let results = join_all(calls.iter().zip(contexts.iter()).map(|(call, call_ctx)| {
            ToolExecutor::execute(
                call_ctx,
                self.tools,
                hooks,
                self.config.short_circuit_hooks,
                self.events,
                call,
            )
        }))
        .await;

        calls
            .into_iter()
            .zip(contexts)
            .zip(results)
            .map(|((call, call_ctx), result)| TurnEntry::Tool {
                id: call_ctx.current_tool_use_id.unwrap_or_default(),
                call,
                result,
            })
            .collect()
    }

    /// Publish an accepted response and run AgentResponse hooks
    fn accept(&self, ctx: &RunContext, agent_name: &str, text: &str) {
        if let Some(hooks) = self.config.hooks.as_deref() {
            let mut hook_ctx = HookContext::agent_response(ctx, text);
            let _ = hooks.run(&mut hook_ctx);
        }

        emit(
            self.events,
            RunEvent::Response {
                agent: agent_name.to_string(),
                text: text.to_string(),
            },
        );
    }
}
