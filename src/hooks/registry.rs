//! Hook Registry
//!
//! Contains:
//! - `Hook` trait - for implementing hooks
//! - `HookMatcher` - matches tools by regex pattern
//! - `HookRegistry` - stores and runs hooks

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use super::types::{HookContext, HookDecision, HookEvent, HookResult};

/// Trait for hook implementations
///
/// Hooks are synchronous and run while the tool call is in flight, so they
/// should only do quick work such as reading or writing the shared state.
pub trait Hook: Send + Sync {
    /// Execute the hook with the given context
    fn call(&self, ctx: &mut HookContext<'_>) -> HookResult;
}

/// Implement Hook for closures
impl<F> Hook for F
where
    F: for<'a> Fn(&mut HookContext<'a>) -> HookResult + Send + Sync,
{
    fn call(&self, ctx: &mut HookContext<'_>) -> HookResult {
        (self)(ctx)
    }
}

/// Type alias for stored hooks
pub type ArcHook = Arc<dyn Hook>;

/// Matches tools by name pattern and executes a hook
pub struct HookMatcher {
    /// Regex pattern to match tool names (None = match all)
    pattern: Option<Regex>,

    /// The hook to execute
    hook: ArcHook,
}

impl HookMatcher {
    /// Create a matcher that matches all tools
    pub fn new<H: Hook + 'static>(hook: H) -> Self {
        Self {
            pattern: None,
            hook: Arc::new(hook),
        }
    }

    /// Create a matcher with a regex pattern
    ///
    /// Pattern examples:
    /// - `"SetState"` - match only SetState
    /// - `"SetState|GetState"` - match the built-in state tools
    pub fn with_pattern<H: Hook + 'static>(pattern: &str, hook: H) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Some(Regex::new(pattern)?),
            hook: Arc::new(hook),
        })
    }

    /// Check if this matcher applies to a tool name
    pub fn matches(&self, tool_name: &str) -> bool {
        match &self.pattern {
            Some(regex) => regex.is_match(tool_name),
            None => true,
        }
    }

    /// Run the hook with the given context
    pub fn run(&self, ctx: &mut HookContext<'_>) -> HookResult {
        self.hook.call(ctx)
    }
}

impl std::fmt::Debug for HookMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookMatcher")
            .field("pattern", &self.pattern.as_ref().map(|r| r.as_str()))
            .finish()
    }
}

/// Central registry for all hooks
///
/// # Example
///
/// ```ignore
/// let mut hooks = HookRegistry::new();
///
/// // Keep the validated context from being overwritten mid-run
/// hooks.add_with_pattern(HookEvent::PreToolUse, "SetState", |ctx| {
///     let key = ctx.tool_input.as_ref()
///         .and_then(|v| v.get("key"))
///         .and_then(|v| v.as_str())
///         .unwrap_or("");
///
///     if key == "context" && ctx.state().contains("context") {
///         HookResult::block("context is already set for this run")
///     } else {
///         HookResult::none()
///     }
/// })?;
/// ```
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<HookEvent, Vec<HookMatcher>>,
}

impl HookRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook that matches all tools
    pub fn add<H: Hook + 'static>(&mut self, event: HookEvent, hook: H) -> &mut Self {
        self.hooks
            .entry(event)
            .or_default()
            .push(HookMatcher::new(hook));
        self
    }

    /// Add a hook with a tool name pattern
    pub fn add_with_pattern<H: Hook + 'static>(
        &mut self,
        event: HookEvent,
        pattern: &str,
        hook: H,
    ) -> Result<&mut Self, regex::Error> {
        self.hooks
            .entry(event)
            .or_default()
            .push(HookMatcher::with_pattern(pattern, hook)?);
        Ok(self)
    }

    /// Add a pre-built matcher
    pub fn add_matcher(&mut self, event: HookEvent, matcher: HookMatcher) -> &mut Self {
        self.hooks.entry(event).or_default().push(matcher);
        self
    }

    /// Check if there are any hooks for an event
    pub fn has_hooks(&self, event: HookEvent) -> bool {
        self.hooks
            .get(&event)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    /// Get the number of hooks for an event
    pub fn hook_count(&self, event: HookEvent) -> usize {
        self.hooks.get(&event).map(|v| v.len()).unwrap_or(0)
    }

    /// Run all matching hooks for an event
    ///
    /// Tool hooks are filtered by tool name; AgentResponse hooks always run.
    /// Matching hooks run in registration order. A hook returning `Proceed`
    /// ends the chain, as does a block when `short_circuit_on_block` is set.
    /// Results combine as Block > Proceed > None, so an earlier block still
    /// wins over a later approval.
    pub fn run(&self, ctx: &mut HookContext<'_>) -> HookResult {
        let event = ctx.event;
        let tool_name = ctx.tool_name.clone();
        let short_circuit = ctx.short_circuit_on_block;

        let matchers = match self.hooks.get(&event) {
            Some(matchers) => matchers,
            None => return HookResult::none(),
        };

        let mut combined = HookResult::none();

        for matcher in matchers {
            let should_run = match (&tool_name, event.is_tool_event()) {
                (Some(name), true) => matcher.matches(name),
                _ => true,
            };

            if !should_run {
                continue;
            }

            let result = matcher.run(ctx);
            let approved = result.decision == Some(HookDecision::Proceed);
            combined = combine_results(combined, result);

            if short_circuit && combined.is_blocked() {
                tracing::debug!("[HookRegistry] Short-circuiting on Block (remaining hooks skipped)");
                break;
            }
            if approved {
                tracing::debug!("[HookRegistry] {} approved by hook (remaining hooks skipped)", event);
                break;
            }
        }

        combined
    }
}

/// Combine two hook results
///
/// Priority: Block > Proceed > None
fn combine_results(a: HookResult, b: HookResult) -> HookResult {
    match (a.decision, b.decision) {
        (Some(HookDecision::Block), _) => a,
        (_, Some(HookDecision::Block)) => b,
        (Some(HookDecision::Proceed), _) => a,
        (_, Some(HookDecision::Proceed)) => b,
        _ => HookResult::none(),
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (event, matchers) in &self.hooks {
            map.entry(event, &matchers.len());
        }
        map.finish()
    }
}
