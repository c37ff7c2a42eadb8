//! LLM-backed event classifier
//!
//! Sends the user's free-text description to a hosted model and turns the
//! one-line label it returns into a `Classification`.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::llm_client::LlmClient;
use super::{Classification, EventClassifier};

/// Event type recorded when the model answers with the corporate label
pub const CORPORATE_EVENT_TYPE: &str = "Corporative";

/// Labels meaning "corporate", compared after upper-casing
const CORPORATE_LABELS: [&str; 2] = ["CORPORATIVO", "CORPORATE"];

/// Placeholder replaced by the description in the user prompt template
pub const DESCRIPTION_PLACEHOLDER: &str = "{event_description}";

pub const SYSTEM_PROMPT: &str = "Eres un asistente que clasifica eventos para una empresa \
de organización de eventos corporativos. Responde con una sola línea y sin explicaciones.";

pub const DEFAULT_USER_TEMPLATE: &str = "Clasifica el siguiente evento.\n\
- Si es un evento corporativo (conferencia, lanzamiento de producto, reunión de empresa, \
team building, fiesta de fin de año de una empresa, congreso, feria comercial), responde \
exactamente: CORPORATIVO\n\
- Si no es corporativo, responde solo con el tipo de evento en español, en una a tres \
palabras (por ejemplo: Boda, Cumpleaños, Graduación).\n\n\
Descripción del evento: {event_description}";

/// Classifier that asks an `LlmClient` for a label
pub struct LlmEventClassifier {
    client: Box<dyn LlmClient>,
    user_template: String,
}

impl LlmEventClassifier {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self {
            client,
            user_template: DEFAULT_USER_TEMPLATE.to_string(),
        }
    }

    /// Replace the user prompt template
    ///
    /// A template without `{event_description}` gets the description appended.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.user_template = template.into();
        self
    }

    pub fn render_prompt(&self, description: &str) -> String {
        if self.user_template.contains(DESCRIPTION_PLACEHOLDER) {
            self.user_template.replace(DESCRIPTION_PLACEHOLDER, description)
        } else {
            format!("{}\n\n{}", self.user_template.trim_end(), description)
        }
    }
}

#[async_trait]
impl EventClassifier for LlmEventClassifier {
    fn is_available(&self) -> bool {
        true
    }

    async fn classify(&self, description: &str) -> Classification {
        let prompt = self.render_prompt(description);
        debug!(
            provider = self.client.provider_name(),
            model = self.client.model_name(),
            "classifying event description"
        );

        match self.client.chat(SYSTEM_PROMPT, &prompt).await {
            Ok(response) => {
                let classification = interpret_label(&response);
                debug!(response = %response.trim(), ?classification, "classifier answered");
                classification
            }
            Err(e) => {
                warn!(
                    provider = self.client.provider_name(),
                    transport = e.is_transport(),
                    "event classification failed: {}",
                    e
                );
                Classification::unknown()
            }
        }
    }
}

/// Map a model reply onto a classification
///
/// The corporate label yields `(true, "Corporative")`; any other non-empty
/// reply is taken as a non-corporate event type, title-cased.
pub fn interpret_label(response: &str) -> Classification {
    let label = response
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim_end_matches('.')
        .trim();

    if CORPORATE_LABELS.contains(&label.to_uppercase().as_str()) {
        return Classification::corporate(CORPORATE_EVENT_TYPE);
    }

    if label.is_empty() {
        return Classification {
            is_corporate: Some(false),
            event_type: None,
        };
    }

    Classification {
        is_corporate: Some(false),
        event_type: Some(title_case(label)),
    }
}

/// Upper-case the first letter of every word, lower-case the rest
///
/// Any non-alphabetic character starts a new word, so `fiesta-sorpresa`
/// becomes `Fiesta-Sorpresa`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
