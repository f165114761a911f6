use std::time::Duration;

use crate::config::MemoryConfig;
use crate::memory::summarization::{self, SummaryOutcome, SUMMARY_REQUEST};
use crate::memory::{MemoryQueryEngine, SharedSessionMemory, StepIngest};

use super::{AgentRunner, RunResult, TraceStep};

/// Instruction appended to every query that carries memory context
const MEMORY_HINT: &str = "Use memory_tool to recall relevant information if needed.";

/// Wrap a query with the rendered memory context
pub fn augment_query(context: &str, query: &str) -> String {
    format!("{}\n\nNEW QUERY: {}\n\n{}", context, query, MEMORY_HINT)
}

/// Everything that happened during one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Result of the primary agent run
    pub result: RunResult,
    /// Step numbers assigned to the ingested trace steps
    pub recorded: Vec<u64>,
    /// Trace steps dropped for lacking a thought or an action
    pub skipped: usize,
    pub summary: SummaryOutcome,
}

/// Drives one query at a time through memory injection, the agent run,
/// trace ingestion and auto-summarization.
///
/// The session lock is only held while reading or writing memory, never
/// across an agent call, so the agent can use the memory tool mid-run.
pub struct SessionOrchestrator<R> {
    runner: R,
    memory: SharedSessionMemory,
    summarize_threshold: usize,
    call_timeout: Option<Duration>,
}

impl<R: AgentRunner> SessionOrchestrator<R> {
    pub fn new(runner: R, memory: SharedSessionMemory) -> Self {
        Self::with_config(runner, memory, &MemoryConfig::default())
    }

    pub fn with_config(runner: R, memory: SharedSessionMemory, config: &MemoryConfig) -> Self {
        Self {
            runner,
            memory,
            summarize_threshold: config.summarize_threshold,
            call_timeout: config.call_timeout(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn memory(&self) -> &SharedSessionMemory {
        &self.memory
    }

    /// Query engine over the same session, e.g. for the memory tool
    pub fn memory_engine(&self) -> MemoryQueryEngine {
        MemoryQueryEngine::new(self.memory.clone())
    }

    /// Run one turn and return the primary agent result
    pub async fn run_turn(&self, query: &str) -> RunResult {
        self.run_turn_with_report(query).await.result
    }

    /// Run one turn and report what it did to session memory
    pub async fn run_turn_with_report(&self, query: &str) -> TurnReport {
        // 1. Assemble context
        let prompt = self.build_prompt(query).await;

        // 2. Delegate
        let result = self.delegate(&prompt).await.unwrap_or_default();

        // 3. Ingest the trace
        let (recorded, skipped) = self.ingest(result.steps()).await;

        // 4. Auto-summarize long responses
        let summary = self.maybe_summarize(&result).await;

        tracing::info!(
            "Turn complete: {} steps recorded, {} skipped, summary {:?}",
            recorded.len(),
            skipped,
            summary
        );

        TurnReport {
            result,
            recorded,
            skipped,
            summary,
        }
    }

    /// Forget stored steps and the summary
    pub async fn reset_memory(&self) {
        self.memory.lock().await.reset();
    }

    async fn build_prompt(&self, query: &str) -> String {
        let memory = self.memory.lock().await;

        if memory.has_history() {
            tracing::debug!(
                "Session {}: injecting {} recent steps into query",
                memory.id(),
                memory.log().len()
            );
            augment_query(&memory.context(), query)
        } else {
            query.to_string()
        }
    }

    /// Call the agent, honoring the optional timeout.
    /// Returns `None` when the call timed out.
    async fn delegate(&self, query: &str) -> Option<RunResult> {
        match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.runner.run(query)).await {
                Ok(result) => Some(result),
                Err(_) => {
                    tracing::warn!("Agent call timed out after {:?}", limit);
                    None
                }
            },
            None => Some(self.runner.run(query).await),
        }
    }

    /// Append every complete trace step under a single lock acquisition
    async fn ingest(&self, steps: &[TraceStep]) -> (Vec<u64>, usize) {
        if steps.is_empty() {
            return (Vec::new(), 0);
        }

        let mut memory = self.memory.lock().await;
        let mut recorded = Vec::new();
        let mut skipped = 0;

        for step in steps {
            match memory.record_step(
                step.thinking.as_deref(),
                step.action.as_deref(),
                step.observations.as_deref(),
            ) {
                StepIngest::Recorded(number) => recorded.push(number),
                StepIngest::Skipped => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(
                "Session {}: skipped {} incomplete trace steps",
                memory.id(),
                skipped
            );
        }

        (recorded, skipped)
    }

    async fn maybe_summarize(&self, result: &RunResult) -> SummaryOutcome {
        let Some(response) = result.response() else {
            return SummaryOutcome::NotNeeded;
        };
        if !summarization::should_summarize(response, self.summarize_threshold) {
            return SummaryOutcome::NotNeeded;
        }

        let summary_result = self.delegate(SUMMARY_REQUEST).await;
        let Some(text) = summarization::usable_summary(
            summary_result.as_ref().and_then(RunResult::response),
        ) else {
            tracing::warn!("Summarization call returned nothing usable; keeping previous summary");
            return SummaryOutcome::Unchanged;
        };

        self.memory.lock().await.update_summary(text);
        SummaryOutcome::Updated(text.to_string())
    }
}
