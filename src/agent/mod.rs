//! The agent runner contract and the session orchestrator built on it.

pub mod orchestrator;
pub mod rig_runner;

use std::future::Future;

use serde::{Deserialize, Serialize};

pub use orchestrator::{SessionOrchestrator, TurnReport};
pub use rig_runner::RigAgentRunner;

/// One reasoning step reported by the agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub thinking: Option<String>,
    pub action: Option<String>,
    pub observations: Option<String>,
}

impl TraceStep {
    pub fn new(thinking: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            thinking: Some(thinking.into()),
            action: Some(action.into()),
            observations: None,
        }
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }

    /// Render a structured action or observation as text.
    /// Plain JSON strings are used as-is, anything else is serialized.
    pub fn structured_text(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// What an agent run returned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub response: Option<String>,
    /// Steps taken during the run, in order
    pub steps: Option<Vec<TraceStep>>,
}

impl RunResult {
    pub fn from_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            steps: None,
        }
    }

    pub fn with_steps(mut self, steps: Vec<TraceStep>) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn steps(&self) -> &[TraceStep] {
        self.steps.as_deref().unwrap_or_default()
    }
}

/// The external reasoning agent.
///
/// Implementations must not fail: errors from the underlying model or tools
/// are reported as a `RunResult` with empty fields.
pub trait AgentRunner: Send + Sync {
    fn run(&self, query: &str) -> impl Future<Output = RunResult> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_text() {
        assert_eq!(TraceStep::structured_text(&json!("plain")), "plain");
        assert_eq!(
            TraceStep::structured_text(&json!({ "tool": "memory_tool" })),
            r#"{"tool":"memory_tool"}"#
        );
    }

    #[test]
    fn test_run_result_accessors() {
        let result = RunResult::from_response("Paris")
            .with_steps(vec![TraceStep::new("think", "act").with_observations("saw")]);

        assert_eq!(result.response(), Some("Paris"));
        assert_eq!(result.steps().len(), 1);
        assert_eq!(result.steps()[0].observations.as_deref(), Some("saw"));
        assert!(RunResult::default().steps().is_empty());
    }
}
