//! `AgentRunner` backed by a rig agent with the memory tool registered.
//!
//! Each run starts from an empty chat history. After the run, the history rig
//! accumulated (assistant tool calls and the tool results sent back) is turned
//! into the step trace that the orchestrator ingests.

use std::collections::HashMap;

use anyhow::Result;
use rig::agent::Agent;
use rig::client::{CompletionClient, Nothing};
use rig::completion::Prompt;
use rig::message::{AssistantContent, Message as RigMessage, ToolResultContent, UserContent};
use rig::providers::{anthropic, ollama, openai};
use rig::tool::ToolDyn;

use crate::config::{HarnessConfig, LLMProvider};
use crate::memory::SharedSessionMemory;
use crate::tools::memory_tools::MemoryTool;

use super::{AgentRunner, RunResult, TraceStep};

/// Provider-specific agent wrapper.
/// Each variant holds a fully-built Agent with tools registered.
enum AgentProvider {
    Anthropic(Agent<anthropic::completion::CompletionModel>),
    OpenAI(Agent<openai::CompletionModel>),
    Ollama(Agent<ollama::CompletionModel>),
}

/// Helper: Create the set of tools for a session
fn create_tools(memory: &SharedSessionMemory) -> Vec<Box<dyn ToolDyn>> {
    vec![Box::new(MemoryTool::new(memory.clone()))]
}

/// Reasoning agent that can consult session memory through `memory_tool`
pub struct RigAgentRunner {
    agent: AgentProvider,
    max_turns: usize,
}

impl RigAgentRunner {
    /// Build the provider client and agent described by `config`
    pub fn new(config: &HarnessConfig, memory: SharedSessionMemory) -> Result<Self> {
        let api_key = config.api_key()?;
        let system_prompt = Self::system_prompt();

        let agent = match config.provider {
            LLMProvider::Anthropic => {
                let client = anthropic::Client::builder().api_key(&api_key).build()?;

                let agent = client
                    .agent(&config.model)
                    .preamble(&system_prompt)
                    .max_tokens(8192)
                    .temperature(config.temperature)
                    .tools(create_tools(&memory))
                    .build();

                AgentProvider::Anthropic(agent)
            }

            LLMProvider::OpenAI => {
                let openai_client = openai::Client::builder().api_key(&api_key).build()?;

                let agent = openai_client
                    .completions_api()
                    .agent(&config.model)
                    .preamble(&system_prompt)
                    .temperature(config.temperature)
                    .tools(create_tools(&memory))
                    .build();

                AgentProvider::OpenAI(agent)
            }

            LLMProvider::Ollama => {
                let ollama_client = if let Some(url) = &config.api_base_url {
                    ollama::Client::builder()
                        .api_key(Nothing)
                        .base_url(url)
                        .build()?
                } else {
                    ollama::Client::new(Nothing)?
                };

                let agent = ollama_client
                    .agent(&config.model)
                    .preamble(&system_prompt)
                    .temperature(config.temperature)
                    .tools(create_tools(&memory))
                    .build();

                AgentProvider::Ollama(agent)
            }
        };

        tracing::info!(
            "Created {} agent with model {} (max {} tool turns)",
            config.provider,
            config.model,
            config.max_turns
        );

        Ok(Self {
            agent,
            max_turns: config.max_turns,
        })
    }

    /// Prompt the agent and return its answer with the chat history of the run
    async fn prompt(&self, query: &str) -> Result<(String, Vec<RigMessage>)> {
        let mut history: Vec<RigMessage> = Vec::new();

        let response = match &self.agent {
            AgentProvider::Anthropic(agent) => {
                agent
                    .prompt(query)
                    .with_history(&mut history)
                    .max_turns(self.max_turns)
                    .await?
            }
            AgentProvider::OpenAI(agent) => {
                agent
                    .prompt(query)
                    .with_history(&mut history)
                    .max_turns(self.max_turns)
                    .await?
            }
            AgentProvider::Ollama(agent) => {
                agent
                    .prompt(query)
                    .with_history(&mut history)
                    .max_turns(self.max_turns)
                    .await?
            }
        };

        Ok((response, history))
    }

    /// System prompt with the memory usage guidelines
    fn system_prompt() -> String {
        r#"You are a careful research agent that solves problems step by step.

## Memory

Your previous reasoning steps and a running summary are kept in memory.
When a query starts with "SUMMARY OF PREVIOUS STEPS", that context comes from
earlier queries in this session. Use it naturally.

Use the **memory_tool** to:
- Recall previous information with operation "recall" and a search term as content
  (use "all" for the full context or "summary" for the current summary)
- Summarize important findings with operation "summarize" and your summary as content

## Final Answer

When you have completed the task, reply with the final answer only. Make sure it:
1. Directly addresses the original question
2. Is in the exact format requested (if specified)
3. Is concise and clear
4. Only includes the answer itself, not your reasoning (unless requested)"#
            .to_string()
    }
}

impl AgentRunner for RigAgentRunner {
    async fn run(&self, query: &str) -> RunResult {
        match self.prompt(query).await {
            Ok((response, history)) => {
                let steps = trace_from_history(&history);
                tracing::debug!(
                    "Agent run finished (response length: {} chars, {} steps)",
                    response.chars().count(),
                    steps.len()
                );
                RunResult {
                    response: Some(response),
                    steps: Some(steps),
                }
            }
            Err(e) => {
                tracing::warn!("Agent run failed: {:#}", e);
                RunResult::default()
            }
        }
    }
}

/// Flattened view of the chat history entries that matter for the trace
#[derive(Debug, Clone, PartialEq, Eq)]
enum HistoryItem {
    /// All text of one assistant message, plus the tool calls it made
    AssistantTurn {
        text: String,
        calls: Vec<(String, String)>,
    },
    /// A tool result sent back to the model, keyed by tool call id
    ToolResult { id: String, text: String },
}

fn flatten_history(history: &[RigMessage]) -> Vec<HistoryItem> {
    let mut items = Vec::new();

    for message in history {
        match message {
            RigMessage::Assistant { content, .. } => {
                let mut texts = Vec::new();
                let mut calls = Vec::new();
                for part in content.iter() {
                    match part {
                        AssistantContent::Text(text) => texts.push(text.text.clone()),
                        AssistantContent::ToolCall(call) => calls.push((
                            call.id.clone(),
                            format!("{}({})", call.function.name, call.function.arguments),
                        )),
                        _ => {}
                    }
                }
                items.push(HistoryItem::AssistantTurn {
                    text: texts.join("\n"),
                    calls,
                });
            }
            RigMessage::User { content, .. } => {
                for part in content.iter() {
                    if let UserContent::ToolResult(result) = part {
                        let text = result
                            .content
                            .iter()
                            .filter_map(|c| match c {
                                ToolResultContent::Text(text) => {
                                    Some(decode_tool_output(&text.text))
                                }
                                _ => None,
                            })
                            .collect::<Vec<_>>()
                            .join("\n");
                        items.push(HistoryItem::ToolResult {
                            id: result.id.clone(),
                            text,
                        });
                    }
                }
            }
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }

    items
}

/// rig hands tool output back to the model JSON-encoded; plain text passes through
fn decode_tool_output(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|value| TraceStep::structured_text(&value))
        .unwrap_or_else(|_| text.to_string())
}

/// One trace step per tool call: the assistant text that accompanied the call
/// is the thought, the call itself is the action, its result the observation.
/// Assistant messages without tool calls (the final answer) are not steps.
fn assemble_trace(items: &[HistoryItem]) -> Vec<TraceStep> {
    let results: HashMap<&str, &str> = items
        .iter()
        .filter_map(|item| match item {
            HistoryItem::ToolResult { id, text } => Some((id.as_str(), text.as_str())),
            _ => None,
        })
        .collect();
    let results = &results;

    items
        .iter()
        .filter_map(|item| match item {
            HistoryItem::AssistantTurn { text, calls } => Some((text, calls)),
            _ => None,
        })
        .flat_map(|(text, calls)| {
            calls.iter().map(move |(id, action)| TraceStep {
                thinking: Some(text.clone()),
                action: Some(action.clone()),
                observations: results.get(id.as_str()).map(|r| r.to_string()),
            })
        })
        .collect()
}

/// Derive the step trace of a run from its rig chat history
pub fn trace_from_history(history: &[RigMessage]) -> Vec<TraceStep> {
    assemble_trace(&flatten_history(history))
}
