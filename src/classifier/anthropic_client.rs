//! Anthropic Client
//!
//! Messages-API client, selectable instead of OpenAI for classification.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::llm_client::{LlmClient, CLASSIFICATION_MAX_TOKENS, CLASSIFICATION_TEMPERATURE};
use crate::error::{CollaboratorError, CollaboratorResult};

/// Default Anthropic model
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic API client
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: Option<String>, timeout: Duration) -> CollaboratorResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            client,
            model: model.unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
        })
    }
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> CollaboratorResult<String> {
        let response = self
            .client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&serde_json::json!({
                "model": &self.model,
                "max_tokens": CLASSIFICATION_MAX_TOKENS,
                "temperature": CLASSIFICATION_TEMPERATURE,
                "system": system_prompt,
                "messages": [{"role": "user", "content": user_prompt}]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| CollaboratorError::malformed("Empty response from Anthropic"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}
