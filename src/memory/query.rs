//! Read and write operations against session memory.
//!
//! The engine accepts the loose `{operation, content}` shape that the agent
//! sends through the memory tool, parses it into a typed [`MemoryOperation`],
//! and produces a typed [`MemoryOutcome`]. Outcomes render to the exact text
//! returned to the agent, so every request terminates with a string.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::{SessionMemory, SharedSessionMemory};

/// Maximum number of thought characters shown per recall match
pub const RECALL_PREVIEW_CHARS: usize = 100;

/// Raw request as received from the agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub operation: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

/// Missing and `null` fields both read as an empty string
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl MemoryRequest {
    pub fn new(operation: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            content: content.into(),
        }
    }
}

/// What a recall request is looking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecallQuery {
    /// The full rendered context
    All,
    /// Just the rolling summary
    Summary,
    /// Case-insensitive substring search over stored steps
    Search(String),
}

impl RecallQuery {
    fn parse(content: &str) -> Self {
        match content.to_lowercase().as_str() {
            "all" => RecallQuery::All,
            "summary" => RecallQuery::Summary,
            _ => RecallQuery::Search(content.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryOperation {
    Recall(RecallQuery),
    Summarize(String),
    Unknown(String),
}

impl From<&MemoryRequest> for MemoryOperation {
    fn from(request: &MemoryRequest) -> Self {
        match request.operation.as_str() {
            "recall" => MemoryOperation::Recall(RecallQuery::parse(&request.content)),
            "summarize" => MemoryOperation::Summarize(request.content.clone()),
            other => MemoryOperation::Unknown(other.to_string()),
        }
    }
}

/// One step that matched a recall search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallMatch {
    pub step: u64,
    /// First [`RECALL_PREVIEW_CHARS`] characters of the thought
    pub preview: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryOutcome {
    Context(String),
    Summary(String),
    Matches(Vec<RecallMatch>),
    NoMatches,
    SummaryUpdated(String),
    UnknownOperation(String),
}

impl fmt::Display for MemoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryOutcome::Context(context) => write!(f, "{}", context),
            MemoryOutcome::Summary(summary) => write!(f, "Current summary: {}", summary),
            MemoryOutcome::Matches(matches) => {
                writeln!(f, "Relevant memories:")?;
                for m in matches {
                    let ellipsis = if m.truncated { "..." } else { "" };
                    writeln!(f, "Step {}: {}{}", m.step, m.preview, ellipsis)?;
                }
                Ok(())
            }
            MemoryOutcome::NoMatches => write!(f, "No relevant memories found."),
            MemoryOutcome::SummaryUpdated(summary) => {
                write!(f, "Summary updated to: {}", summary)
            }
            MemoryOutcome::UnknownOperation(operation) => {
                write!(f, "Unknown memory operation: {}", operation)
            }
        }
    }
}

impl SessionMemory {
    /// Apply a memory operation. Only `Summarize` mutates the session.
    pub fn apply(&mut self, operation: MemoryOperation) -> MemoryOutcome {
        match operation {
            MemoryOperation::Recall(query) => self.recall(&query),
            MemoryOperation::Summarize(content) => {
                self.update_summary(content.clone());
                MemoryOutcome::SummaryUpdated(content)
            }
            MemoryOperation::Unknown(operation) => MemoryOutcome::UnknownOperation(operation),
        }
    }

    /// Read-only recall
    pub fn recall(&self, query: &RecallQuery) -> MemoryOutcome {
        match query {
            RecallQuery::All => MemoryOutcome::Context(self.context()),
            RecallQuery::Summary => MemoryOutcome::Summary(self.summary().read().to_string()),
            RecallQuery::Search(needle) => {
                let needle = needle.to_lowercase();
                let matches: Vec<RecallMatch> = self
                    .log()
                    .records()
                    .filter(|record| record.to_block().to_lowercase().contains(&needle))
                    .map(|record| {
                        let thought = record.thought();
                        RecallMatch {
                            step: record.step(),
                            preview: thought.chars().take(RECALL_PREVIEW_CHARS).collect(),
                            truncated: thought.chars().count() > RECALL_PREVIEW_CHARS,
                        }
                    })
                    .collect();

                if matches.is_empty() {
                    MemoryOutcome::NoMatches
                } else {
                    MemoryOutcome::Matches(matches)
                }
            }
        }
    }
}

/// Serves memory requests against one shared session
#[derive(Debug, Clone)]
pub struct MemoryQueryEngine {
    memory: SharedSessionMemory,
}

impl MemoryQueryEngine {
    pub fn new(memory: SharedSessionMemory) -> Self {
        Self { memory }
    }

    pub fn memory(&self) -> &SharedSessionMemory {
        &self.memory
    }

    /// Execute a request and return the typed outcome
    pub async fn execute(&self, request: &MemoryRequest) -> MemoryOutcome {
        let operation = MemoryOperation::from(request);
        let mut memory = self.memory.lock().await;

        tracing::debug!(
            "Session {}: memory operation {:?}",
            memory.id(),
            operation
        );

        memory.apply(operation)
    }

    /// Execute a request and flatten the outcome to text. Never fails.
    pub async fn handle(&self, operation: &str, content: &str) -> String {
        self.execute(&MemoryRequest::new(operation, content))
            .await
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::create_shared_session_memory;

    fn engine_with_steps(thoughts: &[&str]) -> MemoryQueryEngine {
        let mut memory = SessionMemory::default();
        for thought in thoughts {
            memory.record_step(Some(*thought), Some("search()"), Some("ok"));
        }
        MemoryQueryEngine::new(std::sync::Arc::new(tokio::sync::Mutex::new(memory)))
    }

    #[test]
    fn test_parse_operations() {
        assert_eq!(
            MemoryOperation::from(&MemoryRequest::new("recall", "ALL")),
            MemoryOperation::Recall(RecallQuery::All)
        );
        assert_eq!(
            MemoryOperation::from(&MemoryRequest::new("recall", "Summary")),
            MemoryOperation::Recall(RecallQuery::Summary)
        );
        assert_eq!(
            MemoryOperation::from(&MemoryRequest::new("recall", "Paris")),
            MemoryOperation::Recall(RecallQuery::Search("Paris".to_string()))
        );
        assert_eq!(
            MemoryOperation::from(&MemoryRequest::new("store", "x")),
            MemoryOperation::Unknown("store".to_string())
        );
    }

    #[test]
    fn test_request_content_defaults_to_empty() {
        let request: MemoryRequest =
            serde_json::from_value(serde_json::json!({ "operation": "recall" })).unwrap();

        assert_eq!(request.content, "");
    }

    #[test]
    fn test_request_tolerates_null_and_missing_fields() {
        let request: MemoryRequest = serde_json::from_value(
            serde_json::json!({ "operation": "recall", "content": null }),
        )
        .unwrap();
        assert_eq!(request, MemoryRequest::new("recall", ""));

        let request: MemoryRequest =
            serde_json::from_value(serde_json::json!({ "content": "paris" })).unwrap();
        assert_eq!(
            MemoryOperation::from(&request),
            MemoryOperation::Unknown(String::new())
        );
    }

    #[tokio::test]
    async fn test_recall_all_composition() {
        let memory = create_shared_session_memory(10);
        {
            let mut m = memory.lock().await;
            m.update_summary("S");
            m.record_step(Some("T"), Some("A"), Some("O"));
        }
        let engine = MemoryQueryEngine::new(memory);

        let output = engine.handle("recall", "all").await;

        assert!(output.contains("SUMMARY OF PREVIOUS STEPS:\nS\n"));
        let steps = &output[output.find("RECENT STEPS:").unwrap()..];
        assert_eq!(
            steps,
            "RECENT STEPS:\nStep 1:\nThought: T\nAction: A\nObservation: O\n\n"
        );
    }

    #[tokio::test]
    async fn test_recall_summary() {
        let engine = engine_with_steps(&[]);
        engine.handle("summarize", "Paris is in France.").await;

        assert_eq!(
            engine.handle("recall", "SUMMARY").await,
            "Current summary: Paris is in France."
        );
    }

    #[tokio::test]
    async fn test_recall_search_is_case_insensitive() {
        let engine = engine_with_steps(&[
            "The capital of France is Paris",
            "Tokyo has a large population",
        ]);

        let output = engine.handle("recall", "paris").await;

        assert_eq!(
            output,
            "Relevant memories:\nStep 1: The capital of France is Paris\n"
        );
        assert!(!output.contains("Step 2"));
    }

    #[tokio::test]
    async fn test_recall_search_matches_every_field() {
        let mut memory = SessionMemory::default();
        memory.record_step(Some("look it up"), Some("web_search(\"tokyo\")"), None);
        memory.record_step(Some("compute"), Some("math()"), Some("Tokyo: 14M"));
        let engine = MemoryQueryEngine::new(std::sync::Arc::new(tokio::sync::Mutex::new(memory)));

        let output = engine.handle("recall", "TOKYO").await;

        assert_eq!(output, "Relevant memories:\nStep 1: look it up\nStep 2: compute\n");
    }

    #[tokio::test]
    async fn test_recall_truncates_long_thoughts() {
        let long_thought = "a".repeat(150);
        let engine = engine_with_steps(&[long_thought.as_str()]);

        let output = engine.handle("recall", "aaa").await;

        let expected = format!("Relevant memories:\nStep 1: {}...\n", "a".repeat(100));
        assert_eq!(output, expected);
    }

    #[tokio::test]
    async fn test_recall_no_match() {
        let engine = engine_with_steps(&["Paris"]);

        assert_eq!(
            engine.handle("recall", "no-such-term").await,
            "No relevant memories found."
        );
    }

    #[tokio::test]
    async fn test_summarize_overwrites() {
        let engine = engine_with_steps(&[]);

        assert_eq!(
            engine.handle("summarize", "first").await,
            "Summary updated to: first"
        );
        engine.handle("summarize", "second").await;

        let memory = engine.memory().lock().await;
        assert_eq!(memory.summary().read(), "second");
    }

    #[tokio::test]
    async fn test_unknown_operation_does_not_mutate() {
        let engine = engine_with_steps(&["Paris"]);
        engine.handle("summarize", "kept").await;

        let output = engine.handle("delete", "x").await;

        assert_eq!(output, "Unknown memory operation: delete");
        let memory = engine.memory().lock().await;
        assert_eq!(memory.summary().read(), "kept");
        assert_eq!(memory.log().len(), 1);
    }

    #[test]
    fn test_operation_names_are_case_sensitive() {
        assert_eq!(
            MemoryOperation::from(&MemoryRequest::new("Recall", "all")),
            MemoryOperation::Unknown("Recall".to_string())
        );
    }
}
