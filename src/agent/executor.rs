//! Tool Executor
//!
//! Runs one tool call on behalf of an agent, with hooks and run events.

use crate::core::{RunContext, RunEvent};
use crate::hooks::{HookContext, HookRegistry};
use crate::runtime::channels::{emit, EventSender};
use crate::tools::{ToolRegistry, ToolResult};

use super::agent::ToolCall;

/// Handles tool execution with hooks and event publishing
pub struct ToolExecutor;

impl ToolExecutor {
    /// Execute a tool call
    ///
    /// This handles the full flow:
    /// 1. Run PreToolUse hooks (can block or rewrite input)
    /// 2. Publish ToolStart
    /// 3. Run the tool
    /// 4. Run PostToolUse or PostToolUseFailure hooks
    /// 5. Publish ToolEnd
    ///
    /// Never fails: faults and blocks are reported as error results so the
    /// agent can react to them.
    pub async fn execute(
        ctx: &RunContext,
        tools: &ToolRegistry,
        hooks: Option<&HookRegistry>,
        short_circuit_hooks: bool,
        events: &EventSender,
        call: &ToolCall,
    ) -> ToolResult {
        let tool_name = call.name.as_str();
        let tool_id = ctx.current_tool_use_id.clone().unwrap_or_default();
        let mut input = call.input.clone();

        // === Run PreToolUse hooks ===
        if let Some(hooks) = hooks {
            let mut hook_ctx = HookContext::pre_tool_use(ctx, tool_name, &input, &tool_id)
                .with_short_circuit(short_circuit_hooks);
            let result = hooks.run(&mut hook_ctx);

            if let Some(modified) = hook_ctx.tool_input {
                input = modified;
            }

            if result.is_blocked() {
                let reason = result
                    .reason
                    .unwrap_or_else(|| "Blocked by hook".to_string());
                tracing::info!("[Executor] Hook blocked {}: {}", tool_name, reason);
                let blocked = ToolResult::error(format!("Hook blocked: {}", reason));
                emit(
                    events,
                    RunEvent::ToolEnd {
                        agent: ctx.agent_name.clone(),
                        id: tool_id,
                        name: tool_name.to_string(),
                        result: blocked.clone(),
                    },
                );
                return blocked;
            }
        }

        emit(
            events,
            RunEvent::ToolStart {
                agent: ctx.agent_name.clone(),
                id: tool_id.clone(),
                name: tool_name.to_string(),
                input: input.clone(),
            },
        );

        let result = match tools.execute(tool_name, &input).await {
            Ok(result) => {
                if let Some(hooks) = hooks {
                    let mut hook_ctx =
                        HookContext::post_tool_use(ctx, tool_name, &input, &tool_id, &result);
                    // PostToolUse hooks observe; their decision is ignored
                    let _ = hooks.run(&mut hook_ctx);
                }
                result
            }
            Err(e) => {
                let error_msg = format!("Tool execution failed: {}", e);
                tracing::warn!("[Executor] {} failed: {}", tool_name, e);

                if let Some(hooks) = hooks {
                    let mut hook_ctx = HookContext::post_tool_use_failure(
                        ctx, tool_name, &input, &tool_id, &error_msg,
                    );
                    let _ = hooks.run(&mut hook_ctx);
                }

                ToolResult::error(error_msg)
            }
        };

        emit(
            events,
            RunEvent::ToolEnd {
                agent: ctx.agent_name.clone(),
                id: tool_id,
                name: tool_name.to_string(),
                result: result.clone(),
            },
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SharedState;
    use crate::hooks::{HookEvent, HookResult};
    use crate::runtime::channels::create_event_channel;
    use crate::tools::{GetStateTool, SetStateTool};
    use chrono::Utc;
    use serde_json::json;

    fn setup() -> (RunContext, ToolRegistry) {
        let state = SharedState::shared();
        let mut tools = ToolRegistry::new();
        tools.register(SetStateTool::new(state.clone()));
        tools.register(GetStateTool::new(state.clone()));
        let ctx = RunContext::new("run", Utc::now(), "agent", state).with_tool_use_id("agent-0-0-0");
        (ctx, tools)
    }

    #[tokio::test]
    async fn test_execute_publishes_start_and_end() {
        let (ctx, tools) = setup();
        let events = create_event_channel();
        let mut rx = events.subscribe();

        let call = ToolCall::new("SetState", json!({"key": "k", "value": "v"}));
        let result = ToolExecutor::execute(&ctx, &tools, None, false, &events, &call).await;

        assert!(!result.is_error);
        assert_eq!(ctx.state().get_str("k").as_deref(), Some("v"));
        assert!(matches!(rx.recv().await.unwrap(), RunEvent::ToolStart { id, .. } if id == "agent-0-0-0"));
        assert!(matches!(rx.recv().await.unwrap(), RunEvent::ToolEnd { result, .. } if !result.is_error));
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_error_result() {
        let (ctx, tools) = setup();
        let events = create_event_channel();

        let call = ToolCall::new("Missing", json!({}));
        let result = ToolExecutor::execute(&ctx, &tools, None, false, &events, &call).await;

        assert!(result.is_error);
        assert_eq!(result.output, "Tool execution failed: Tool not found: Missing");
    }

    #[tokio::test]
    async fn test_pre_hook_blocks_and_rewrites() {
        let (ctx, tools) = setup();
        let events = create_event_channel();

        let mut hooks = HookRegistry::new();
        hooks
            .add_with_pattern(HookEvent::PreToolUse, "^SetState$", |hook_ctx: &mut HookContext| {
                if let Some(input) = hook_ctx.tool_input.as_mut() {
                    input["key"] = json!("namespaced.k");
                }
                HookResult::none()
            })
            .unwrap();
        hooks
            .add_with_pattern(HookEvent::PreToolUse, "^GetState$", |_ctx: &mut HookContext| {
                HookResult::block("reads are disabled")
            })
            .unwrap();

        let set = ToolCall::new("SetState", json!({"key": "k", "value": 1}));
        let result = ToolExecutor::execute(&ctx, &tools, Some(&hooks), false, &events, &set).await;
        assert!(!result.is_error);
        assert!(ctx.state().contains("namespaced.k"));
        assert!(!ctx.state().contains("k"));

        let get = ToolCall::new("GetState", json!({"key": "namespaced.k"}));
        let result = ToolExecutor::execute(&ctx, &tools, Some(&hooks), false, &events, &get).await;
        assert_eq!(result, ToolResult::error("Hook blocked: reads are disabled"));
    }

    #[tokio::test]
    async fn test_post_hooks_see_results() {
        let (ctx, tools) = setup();
        let events = create_event_channel();

        let mut hooks = HookRegistry::new();
        hooks.add(HookEvent::PostToolUse, |hook_ctx: &mut HookContext| {
            let output = hook_ctx
                .tool_result
                .as_ref()
                .map(|r| r.output.clone())
                .unwrap_or_default();
            hook_ctx.state().set("last_output", output);
            HookResult::none()
        });
        hooks.add(HookEvent::PostToolUseFailure, |hook_ctx: &mut HookContext| {
            let error = hook_ctx.error.clone().unwrap_or_default();
            hook_ctx.state().set("last_error", error);
            HookResult::none()
        });

        let call = ToolCall::new("SetState", json!({"key": "k", "value": 1}));
        ToolExecutor::execute(&ctx, &tools, Some(&hooks), false, &events, &call).await;
        assert_eq!(ctx.state().get_str("last_output").as_deref(), Some("Stored 'k'"));

        let call = ToolCall::new("Missing", json!({}));
        ToolExecutor::execute(&ctx, &tools, Some(&hooks), false, &events, &call).await;
        assert!(ctx.state().contains("last_error"));
    }
}
