pub mod context_builder;
pub mod query;
pub mod step_counter;
pub mod summarization;
pub mod working_memory;

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

pub use context_builder::ContextAssembler;
pub use query::{MemoryOperation, MemoryOutcome, MemoryQueryEngine, MemoryRequest, RecallQuery};
pub use step_counter::StepCounter;
pub use summarization::{RollingSummary, SummaryOutcome};
pub use working_memory::{BoundedInteractionLog, InteractionRecord};

use working_memory::{NO_ACTION, NO_OBSERVATION, NO_THOUGHT};

/// A shared handle to one session's memory, used by the orchestrator and the memory tool.
pub type SharedSessionMemory = Arc<Mutex<SessionMemory>>;

pub fn create_shared_session_memory(capacity: usize) -> SharedSessionMemory {
    Arc::new(Mutex::new(SessionMemory::new(capacity)))
}

/// Result of offering one trace step to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepIngest {
    /// Stored under this step number
    Recorded(u64),
    /// Missing a thought or an action; not stored and not counted
    Skipped,
}

/// All memory belonging to one session: recent steps, the rolling summary
/// and the step counter.
#[derive(Debug, Clone)]
pub struct SessionMemory {
    id: Uuid,
    log: BoundedInteractionLog,
    summary: RollingSummary,
    counter: StepCounter,
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new(working_memory::DEFAULT_LOG_CAPACITY)
    }
}

impl SessionMemory {
    /// Create empty session memory keeping at most `capacity` recent steps
    pub fn new(capacity: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            log: BoundedInteractionLog::new(capacity),
            summary: RollingSummary::new(),
            counter: StepCounter::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn log(&self) -> &BoundedInteractionLog {
        &self.log
    }

    pub fn summary(&self) -> &RollingSummary {
        &self.summary
    }

    pub fn step_counter(&self) -> &StepCounter {
        &self.counter
    }

    /// True once there is a summary or at least one stored step
    pub fn has_history(&self) -> bool {
        !self.summary.is_empty() || !self.log.is_empty()
    }

    /// Render the summary and recent steps for prompt injection
    pub fn context(&self) -> String {
        ContextAssembler::render(&self.summary, &self.log)
    }

    /// Offer one reasoning step to the session.
    ///
    /// The step is stored only when both a thought and an action are present.
    /// Present-but-empty values and a missing observation get placeholders.
    pub fn record_step(
        &mut self,
        thought: Option<&str>,
        action: Option<&str>,
        observation: Option<&str>,
    ) -> StepIngest {
        let (Some(thought), Some(action)) = (thought, action) else {
            return StepIngest::Skipped;
        };

        let step = self.counter.next_step();
        let record = InteractionRecord::new(
            step,
            non_empty_or(thought, NO_THOUGHT),
            non_empty_or(action, NO_ACTION),
            observation.unwrap_or(NO_OBSERVATION),
        );

        if let Some(evicted) = self.log.append(record) {
            tracing::debug!(
                "Session {}: evicted step {} from the interaction log",
                self.id,
                evicted.step()
            );
        }

        StepIngest::Recorded(step)
    }

    /// Replace the rolling summary (an empty string clears it)
    pub fn update_summary(&mut self, text: impl Into<String>) {
        self.summary.update(text);
    }

    /// Forget stored steps and the summary. The step counter keeps counting.
    pub fn reset(&mut self) {
        self.log.clear();
        self.summary.update("");
        tracing::info!("Session {}: memory reset", self.id);
    }
}

fn non_empty_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}
