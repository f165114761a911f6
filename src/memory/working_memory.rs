use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of reasoning steps kept in the interaction log
pub const DEFAULT_LOG_CAPACITY: usize = 10;

/// Placeholder used when a trace step carries an empty thought
pub const NO_THOUGHT: &str = "No explicit thought";
/// Placeholder used when a trace step carries an empty action
pub const NO_ACTION: &str = "No action";
/// Placeholder used when a trace step has no observation
pub const NO_OBSERVATION: &str = "No observation";

/// One reasoning step taken by the agent during a run.
///
/// Records are immutable once created; the step number is assigned by the
/// session's step counter at append time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    step: u64,
    thought: String,
    action: String,
    observation: String,
    recorded_at: DateTime<Utc>,
}

impl InteractionRecord {
    pub fn new(
        step: u64,
        thought: impl Into<String>,
        action: impl Into<String>,
        observation: impl Into<String>,
    ) -> Self {
        Self {
            step,
            thought: thought.into(),
            action: action.into(),
            observation: observation.into(),
            recorded_at: Utc::now(),
        }
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn thought(&self) -> &str {
        &self.thought
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn observation(&self) -> &str {
        &self.observation
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Render the record as the four labeled lines used in prompt context.
    /// This is also the text that recall queries are matched against.
    pub fn to_block(&self) -> String {
        format!(
            "Step {}:\nThought: {}\nAction: {}\nObservation: {}\n",
            self.step, self.thought, self.action, self.observation
        )
    }
}

/// Bounded Interaction Log keeps the most recent reasoning steps
/// with strict FIFO eviction
#[derive(Debug, Clone)]
pub struct BoundedInteractionLog {
    records: VecDeque<InteractionRecord>,
    capacity: usize,
}

impl Default for BoundedInteractionLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl BoundedInteractionLog {
    /// Create an empty log holding at most `capacity` records (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record at the back.
    /// Returns the oldest record if it had to be evicted to stay within capacity.
    pub fn append(&mut self, record: InteractionRecord) -> Option<InteractionRecord> {
        self.records.push_back(record);

        if self.records.len() > self.capacity {
            self.records.pop_front()
        } else {
            None
        }
    }

    /// Current contents, oldest first
    pub fn records(&self) -> impl Iterator<Item = &InteractionRecord> + Clone + '_ {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every stored record
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(step: u64) -> InteractionRecord {
        InteractionRecord::new(
            step,
            format!("thought {}", step),
            format!("action {}", step),
            format!("observation {}", step),
        )
    }

    #[test]
    fn test_append_within_capacity() {
        let mut log = BoundedInteractionLog::new(10);

        let evicted = log.append(create_test_record(1));

        assert!(evicted.is_none());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_fifo_eviction_keeps_last_k() {
        let mut log = BoundedInteractionLog::new(10);

        let mut evicted_steps = Vec::new();
        for step in 1..=12 {
            if let Some(evicted) = log.append(create_test_record(step)) {
                evicted_steps.push(evicted.step());
            }
        }

        let steps: Vec<u64> = log.records().map(|r| r.step()).collect();
        assert_eq!(steps, (3..=12).collect::<Vec<_>>());
        assert_eq!(evicted_steps, vec![1, 2]);
        assert_eq!(log.len(), 10);
    }

    #[test]
    fn test_records_iterator_is_restartable() {
        let mut log = BoundedInteractionLog::new(3);
        log.append(create_test_record(1));
        log.append(create_test_record(2));

        let iter = log.records();
        let first: Vec<u64> = iter.clone().map(|r| r.step()).collect();
        let second: Vec<u64> = iter.map(|r| r.step()).collect();

        assert_eq!(first, second);
        assert_eq!(first, vec![1, 2]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut log = BoundedInteractionLog::new(0);
        assert_eq!(log.capacity(), 1);

        log.append(create_test_record(1));
        let evicted = log.append(create_test_record(2));

        assert_eq!(evicted.map(|r| r.step()), Some(1));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut log = BoundedInteractionLog::default();
        log.append(create_test_record(1));

        assert_eq!(log.len(), 1);

        log.clear();

        assert!(log.is_empty());
        assert_eq!(log.capacity(), DEFAULT_LOG_CAPACITY);
    }

    #[test]
    fn test_block_rendering() {
        let record = InteractionRecord::new(7, "T", "A", "O");

        assert_eq!(
            record.to_block(),
            "Step 7:\nThought: T\nAction: A\nObservation: O\n"
        );
    }
}
