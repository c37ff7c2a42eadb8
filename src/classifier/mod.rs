//! Event classification
//!
//! The event-type stage depends on `EventClassifier` only. The production
//! implementation asks a hosted LLM; when no API key is configured the
//! classifier reports itself unavailable and the stage asks the user instead.

pub mod anthropic_client;
pub mod backend;
pub mod llm_classifier;
pub mod llm_client;
pub mod openai_client;

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub use backend::ClassifierBackend;
pub use llm_classifier::{interpret_label, LlmEventClassifier};
pub use llm_client::LlmClient;

use crate::config::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::error::{LeadError, LeadResult};
use anthropic_client::AnthropicClient;
use openai_client::OpenAiClient;

/// Result of classifying a free-text description
///
/// Both fields are `None` when classification failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub is_corporate: Option<bool>,
    pub event_type: Option<String>,
}

impl Classification {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn corporate(event_type: impl Into<String>) -> Self {
        Self {
            is_corporate: Some(true),
            event_type: Some(event_type.into()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.is_corporate.is_none()
    }
}

/// Labels a free-text event description as corporate or not
#[async_trait]
pub trait EventClassifier: Send + Sync {
    /// Whether `classify` can be attempted at all
    fn is_available(&self) -> bool;

    /// Classify; failures come back as `Classification::unknown()`
    async fn classify(&self, description: &str) -> Classification;
}

/// Stand-in used when no classifier is configured
#[derive(Debug, Clone, Default)]
pub struct DisabledClassifier {
    reason: String,
}

impl DisabledClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl EventClassifier for DisabledClassifier {
    fn is_available(&self) -> bool {
        false
    }

    async fn classify(&self, _description: &str) -> Classification {
        Classification::unknown()
    }
}

/// Classifier settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub backend: ClassifierBackend,
    pub api_key: Option<String>,
    pub model: Option<String>,
    /// File holding a replacement user prompt template
    pub prompt_path: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            api_key: None,
            model: None,
            prompt_path: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ClassifierConfig {
    pub fn from_env(timeout: Duration) -> LeadResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), timeout)
    }

    pub fn from_lookup<F>(lookup: F, timeout: Duration) -> LeadResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("LEAD_CLASSIFIER_BACKEND") {
            Some(raw) => raw
                .parse::<ClassifierBackend>()
                .map_err(|e| LeadError::config(e.to_string()))?,
            None => ClassifierBackend::default(),
        };

        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            backend,
            api_key: non_blank(backend.api_key_var()),
            model: non_blank(backend.model_var()),
            prompt_path: non_blank("LEAD_CLASSIFIER_PROMPT").map(PathBuf::from),
            timeout,
        })
    }
}

/// Build the configured classifier, degrading to `DisabledClassifier`
///
/// Never fails: a missing key, unreadable prompt file or client build error
/// all produce a disabled classifier with the reason logged.
pub fn build_classifier(config: &ClassifierConfig) -> Box<dyn EventClassifier> {
    let Some(api_key) = config.api_key.clone() else {
        let reason = format!("{} not set", config.backend.api_key_var());
        info!(backend = %config.backend, "event classifier disabled: {}", reason);
        return Box::new(DisabledClassifier::new(reason));
    };

    let client: Box<dyn LlmClient> = match config.backend {
        ClassifierBackend::OpenAi => {
            match OpenAiClient::new(api_key, config.model.clone(), config.timeout) {
                Ok(client) => Box::new(client),
                Err(e) => return disabled_after_error("OpenAI client", &e),
            }
        }
        ClassifierBackend::Anthropic => {
            match AnthropicClient::new(api_key, config.model.clone(), config.timeout) {
                Ok(client) => Box::new(client),
                Err(e) => return disabled_after_error("Anthropic client", &e),
            }
        }
    };

    let mut classifier = LlmEventClassifier::new(client);
    if let Some(path) = &config.prompt_path {
        match std::fs::read_to_string(path) {
            Ok(template) => classifier = classifier.with_template(template),
            Err(e) => {
                return disabled_after_error(&format!("prompt file {}", path.display()), &e)
            }
        }
    }

    info!(backend = %config.backend, "event classifier ready");
    Box::new(classifier)
}

fn disabled_after_error(what: &str, err: &dyn std::fmt::Display) -> Box<dyn EventClassifier> {
    warn!("event classifier disabled, {} failed: {}", what, err);
    Box::new(DisabledClassifier::new(format!("{} failed: {}", what, err)))
}
