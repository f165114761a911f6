use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use earthagent::{create_shared_session_memory, HarnessConfig, RigAgentRunner, SessionOrchestrator};

/// Asked when no questions are given: the follow-up only makes sense with memory
const SAMPLE_QUESTIONS: [&str; 2] = [
    "What is the capital of France?",
    "What is the population of this city?",
];

#[derive(Debug, Parser)]
#[command(name = "earthagent", version, about = "Ask a reasoning agent questions within one memory session")]
struct Cli {
    /// Questions to ask, in order, within one session
    questions: Vec<String>,

    /// Override the configured model
    #[arg(long)]
    model: Option<String>,

    /// Print the session memory after the last question
    #[arg(long)]
    show_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = HarnessConfig::from_env().context("Failed to load configuration")?;
    if let Some(model) = cli.model {
        config.model = model;
    }

    let memory = create_shared_session_memory(config.memory.capacity);
    let runner =
        RigAgentRunner::new(&config, memory.clone()).context("Failed to create agent")?;
    let orchestrator = SessionOrchestrator::with_config(runner, memory.clone(), &config.memory);

    let questions: Vec<String> = if cli.questions.is_empty() {
        SAMPLE_QUESTIONS.iter().map(|q| q.to_string()).collect()
    } else {
        cli.questions
    };

    for question in &questions {
        println!("\n=== QUESTION: {} ===\n", question);

        let result = orchestrator.run_turn(question).await;
        match result.response() {
            Some(answer) => println!("FINAL ANSWER: {}", answer),
            None => println!("NO ANSWER: the agent returned no response"),
        }
    }

    if cli.show_memory {
        println!("\n{}", memory.lock().await.context());
    }

    Ok(())
}
