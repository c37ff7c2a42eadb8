//! LLM Client Trait
//!
//! Single-exchange chat interface shared by the OpenAI and Anthropic backends.

use async_trait::async_trait;

use crate::error::CollaboratorResult;

/// Sampling temperature for classification; kept low for stable labels
pub const CLASSIFICATION_TEMPERATURE: f64 = 0.1;

/// Labels are one to three words
pub const CLASSIFICATION_MAX_TOKENS: u32 = 20;

/// One request/response exchange with a hosted model
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send system + user prompts, return the raw text of the reply
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> CollaboratorResult<String>;

    /// Model name for logging
    fn model_name(&self) -> &str;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
