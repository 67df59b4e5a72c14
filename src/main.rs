use colored::Colorize;
use serde_json::json;

use shadow_state_sdk::agent::{AgentConfig, ContextContainsValidator, ScriptedAgent};
use shadow_state_sdk::core::{RunEvent, SharedStateRef};
use shadow_state_sdk::logging::{self, LogConfig};
use shadow_state_sdk::runtime::Orchestrator;
use shadow_state_sdk::tools::{GetStateTool, SetStateTool};

const QUESTION: &str = "What is the capital of France?";

fn answerer(state: SharedStateRef, answers: &[&str]) -> ScriptedAgent {
    let mut agent = ScriptedAgent::new("answerer")
        .with_description("Answers from the research context")
        .then_call("GetState", json!({"key": "context"}));
    for answer in answers {
        agent = agent.then_respond(*answer);
    }
    agent.with_validator(ContextContainsValidator::for_context(state))
}

fn build_orchestrator(answers: &'static [&'static str]) -> Orchestrator {
    let mut orchestrator = Orchestrator::new(AgentConfig::new().with_max_validation_attempts(2));
    orchestrator
        .register_tool(SetStateTool::new)
        .register_tool(GetStateTool::new)
        .register_agent(|_state| {
            ScriptedAgent::new("researcher")
                .with_description("Looks up facts and stores them")
                .then_call(
                    "SetState",
                    json!({"key": "context", "value": "Paris is the capital of France"}),
                )
                .then_respond("Stored research context")
        })
        .register_agent(move |state| answerer(state, answers));
    orchestrator
}

fn print_event(event: &RunEvent) {
    match event {
        RunEvent::ToolStart { agent, name, input, .. } => {
            println!("  {} {} -> {} {}", "[tool]".dimmed(), agent, name.cyan(), input);
        }
        RunEvent::ToolEnd { name, result, .. } => {
            if result.is_error {
                println!("  {} {}: {}", "[tool]".dimmed(), name, result.output.red());
            } else {
                println!("  {} {}: {}", "[tool]".dimmed(), name, result.output.green());
            }
        }
        RunEvent::ResponseRejected { agent, response, reason } => {
            println!(
                "  {} {} said '{}': {}",
                "[rejected]".yellow(),
                agent,
                response,
                reason
            );
        }
        RunEvent::Response { agent, text } => {
            println!("  {} {}: {}", "[response]".green(), agent, text.bold());
        }
        RunEvent::RunFinished { run_id, .. } => {
            println!("  {} {}", "[finished]".dimmed(), run_id);
        }
    }
}

fn spawn_printer(mut rx: shadow_state_sdk::runtime::EventReceiver) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            print_event(&event);
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Warnings only unless RUST_LOG is set
    let mut log_config = LogConfig::from_env();
    if std::env::var("RUST_LOG").is_err() {
        log_config = log_config.with_filter("warn");
    }
    let _guard = logging::init_logging(&log_config)?;

    println!("{}", "=== Grounded answer ===".bold());
    let orchestrator = build_orchestrator(&["Paris"]);
    let run = orchestrator.start_run()?;
    let printer = spawn_printer(run.subscribe());

    run.execute("researcher", "Research the capital of France").await?;
    let response = run.execute("answerer", QUESTION).await?;
    println!(
        "{} {} ({} attempt(s))",
        "Answer:".bold(),
        response.text.green(),
        response.attempts
    );
    let summary = run.finish();
    printer.await?;
    println!("Run lasted {} ms\n", summary.duration_ms());

    println!("{}", "=== Ungrounded answer is retried ===".bold());
    let orchestrator = build_orchestrator(&["Berlin", "Paris"]);
    let run = orchestrator.start_run()?;
    let printer = spawn_printer(run.subscribe());

    run.execute("researcher", "Research the capital of France").await?;
    let response = run.execute("answerer", QUESTION).await?;
    println!(
        "{} {} ({} attempt(s))",
        "Answer:".bold(),
        response.text.green(),
        response.attempts
    );
    run.finish();
    printer.await?;
    println!();

    println!("{}", "=== Missing prerequisite ===".bold());
    let orchestrator = build_orchestrator(&["Paris", "Paris"]);
    let run = orchestrator.start_run()?;
    let printer = spawn_printer(run.subscribe());

    match run.execute("answerer", QUESTION).await {
        Ok(response) => println!("{} {}", "Unexpected answer:".red(), response.text),
        Err(e) => println!("{} {}", "Refused:".yellow(), e),
    }
    run.finish();
    printer.await?;

    Ok(())
}
