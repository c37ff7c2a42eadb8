//! OpenAI Client
//!
//! Chat-completions client used for event classification.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::llm_client::{LlmClient, CLASSIFICATION_MAX_TOKENS, CLASSIFICATION_TEMPERATURE};
use crate::error::{CollaboratorError, CollaboratorResult};

/// Default OpenAI model
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    /// Create a client with a request timeout
    pub fn new(api_key: String, model: Option<String>, timeout: Duration) -> CollaboratorResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            client,
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            endpoint: OPENAI_CHAT_URL.to_string(),
        })
    }

    /// Point at a different chat-completions endpoint (proxies, compatible servers)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> CollaboratorResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": &self.model,
                "messages": [
                    {"role": "system", "content": system_prompt},
                    {"role": "user", "content": user_prompt}
                ],
                "temperature": CLASSIFICATION_TEMPERATURE,
                "max_tokens": CLASSIFICATION_MAX_TOKENS
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

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CollaboratorError::malformed("OpenAI returned no choices"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}
