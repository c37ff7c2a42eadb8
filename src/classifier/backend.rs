//! Backend Selection
//!
//! Which hosted model provider classifies event descriptions.

use std::str::FromStr;
use thiserror::Error;

/// LLM provider used by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierBackend {
    /// OpenAI chat completions (default)
    #[default]
    OpenAi,
    /// Anthropic messages
    Anthropic,
}

impl ClassifierBackend {
    /// Environment variable holding this backend's API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ClassifierBackend::OpenAi => "OPENAI_API_KEY",
            ClassifierBackend::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Environment variable overriding this backend's model
    pub fn model_var(&self) -> &'static str {
        match self {
            ClassifierBackend::OpenAi => "OPENAI_MODEL",
            ClassifierBackend::Anthropic => "ANTHROPIC_MODEL",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClassifierBackend::OpenAi => "OpenAI",
            ClassifierBackend::Anthropic => "Anthropic",
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown LEAD_CLASSIFIER_BACKEND '{0}'. Valid values: openai, gpt, anthropic, claude")]
pub struct ParseBackendError(String);

impl FromStr for ClassifierBackend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Ok(ClassifierBackend::OpenAi),
            "anthropic" | "claude" => Ok(ClassifierBackend::Anthropic),
            other => Err(ParseBackendError(other.to_string())),
        }
    }
}

impl std::fmt::Display for ClassifierBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
