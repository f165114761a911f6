//! Memory tool for agent access to session memory.
//!
//! Provides `MemoryTool`, a rig Tool that lets the agent read and write the
//! session it is running in:
//! - `recall`: "all" for the full context, "summary" for the rolling summary,
//!   anything else as a case-insensitive search over recent steps
//! - `summarize`: replace the rolling summary
//!
//! The tool never fails. Unknown operations are answered with a message so the
//! model can correct itself.

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde_json::json;

use crate::memory::{MemoryQueryEngine, MemoryRequest, SharedSessionMemory};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MemoryToolError(String);

// ---------------------------------------------------------------------------
// MemoryTool
// ---------------------------------------------------------------------------

/// rig Tool serving recall and summarize requests against session memory.
#[derive(Debug, Clone)]
pub struct MemoryTool {
    engine: MemoryQueryEngine,
}

impl MemoryTool {
    pub fn new(memory: SharedSessionMemory) -> Self {
        Self {
            engine: MemoryQueryEngine::new(memory),
        }
    }
}

impl Tool for MemoryTool {
    const NAME: &'static str = "memory_tool";
    type Error = MemoryToolError;
    type Args = MemoryRequest;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Interact with the agent's memory system. Use operation 'recall' \
                to look up earlier reasoning steps: content 'all' returns the full memory \
                context, 'summary' returns the current summary, and any other text is \
                searched for (case-insensitive) in recent steps. Use operation 'summarize' \
                to replace the session summary with the given content."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": ["recall", "summarize"],
                        "description": "The operation to perform"
                    },
                    "content": {
                        "type": "string",
                        "description": "Query for recall, or the new summary for summarize (default: empty)"
                    }
                },
                "required": ["operation"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let output = self.engine.execute(&args).await.to_string();

        tracing::info!(
            "Memory tool '{}' called ({} chars returned)",
            args.operation,
            output.len()
        );

        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
