use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// LLM Provider types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    #[default]
    Anthropic,
    OpenAI,
    Ollama,
}

impl LLMProvider {
    /// Returns whether this provider requires an API key
    pub fn needs_api_key(&self) -> bool {
        match self {
            LLMProvider::Anthropic => true,
            LLMProvider::OpenAI => true,
            LLMProvider::Ollama => false,
        }
    }

    /// Environment variable holding the API key for this provider
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LLMProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LLMProvider::OpenAI => Some("OPENAI_API_KEY"),
            LLMProvider::Ollama => None,
        }
    }

    /// Returns the default model for this provider (if any)
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            LLMProvider::Anthropic => Some("claude-sonnet-4-5-20250929"),
            LLMProvider::OpenAI => Some("gpt-5-mini-2025-08-07"),
            LLMProvider::Ollama => None, // No default
        }
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for LLMProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(LLMProvider::Anthropic),
            "openai" => Ok(LLMProvider::OpenAI),
            "ollama" => Ok(LLMProvider::Ollama),
            other => anyhow::bail!("Unknown LLM provider: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        assert_eq!("Anthropic".parse::<LLMProvider>().unwrap(), LLMProvider::Anthropic);
        assert_eq!(" openai ".parse::<LLMProvider>().unwrap(), LLMProvider::OpenAI);
        assert_eq!("ollama".parse::<LLMProvider>().unwrap(), LLMProvider::Ollama);
        assert!("litellm".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for provider in [LLMProvider::Anthropic, LLMProvider::OpenAI, LLMProvider::Ollama] {
            assert_eq!(provider.to_string().parse::<LLMProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_api_key_requirements() {
        assert!(LLMProvider::Anthropic.needs_api_key());
        assert_eq!(LLMProvider::OpenAI.api_key_env(), Some("OPENAI_API_KEY"));
        assert!(!LLMProvider::Ollama.needs_api_key());
        assert!(LLMProvider::Ollama.default_model().is_none());
    }
}
