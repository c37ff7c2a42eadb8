//! Conversation pipeline
//!
//! Five stages run in a fixed order: event type, budget, contact details,
//! qualification, persistence. Each stage takes the record produced by the
//! previous one and returns it with its own fields added. Collaborators are
//! passed in explicitly so tests can substitute doubles.

use tracing::{debug, info, warn};

use crate::classifier::{Classification, EventClassifier};
use crate::collectors::{
    collect_choice, collect_contact, collect_event_route, collect_number, collect_string,
    is_affirmative, EventRoute, MANUAL_CHOICES,
};
use crate::config::LeadConfig;
use crate::console::Console;
use crate::error::LeadResult;
use crate::lead::LeadRecord;
use crate::messages::{self, NOT_SPECIFIED};
use crate::qualifier::{qualify, Qualification};
use crate::sheets::row::format_budget;
use crate::sheets::LeadStore;

// =============================================================================
// STAGE 1: EVENT TYPE
// =============================================================================

/// Determine whether the event is corporate, directly or via the classifier
pub async fn collect_event_type(
    console: &mut dyn Console,
    classifier: &dyn EventClassifier,
    record: LeadRecord,
) -> LeadResult<LeadRecord> {
    console.say(messages::WELCOME)?;

    match collect_event_route(console)? {
        EventRoute::Corporate => {
            let event_type = ask_event_type(console, true)?;
            record.with_event(true, event_type)
        }
        EventRoute::NonCorporate => {
            let event_type = ask_event_type(console, false)?;
            record.with_event(false, event_type)
        }
        EventRoute::Describe(description) => {
            if classifier.is_available() {
                console.say(messages::ANALYZING_DESCRIPTION)?;
                let classification = classifier.classify(&description).await;
                if let Some(result) = apply_classification(console, classification)? {
                    let (is_corporate, event_type) = result;
                    return record.with_event(is_corporate, Some(event_type));
                }
                warn!("classifier call failed, falling back to manual classification");
            } else {
                debug!("classifier unavailable, asking for manual classification");
            }

            console.say(messages::CLASSIFIER_UNAVAILABLE)?;
            console.say(messages::MANUAL_CLASSIFICATION_PROMPT)?;
            let choice = collect_choice(
                console,
                messages::MANUAL_CORPORATE_QUESTION,
                &MANUAL_CHOICES,
                false,
            )?;
            let is_corporate = is_affirmative(&choice);
            let event_type = ask_event_type(console, is_corporate)?;
            record.with_event(is_corporate, event_type)
        }
    }
}

/// Announce a classifier verdict; `None` when classification failed
fn apply_classification(
    console: &mut dyn Console,
    classification: Classification,
) -> LeadResult<Option<(bool, String)>> {
    let Some(is_corporate) = classification.is_corporate else {
        return Ok(None);
    };

    if is_corporate {
        console.say(messages::DESCRIPTION_CORPORATE)?;
    } else {
        console.say(messages::DESCRIPTION_NOT_CORPORATE)?;
    }

    let event_type = classification
        .event_type
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    info!(is_corporate, event_type = %event_type, "event classified from description");
    Ok(Some((is_corporate, event_type)))
}

/// Free-text follow-up; a blank answer leaves the event type unset
fn ask_event_type(console: &mut dyn Console, is_corporate: bool) -> LeadResult<Option<String>> {
    let prompt = if is_corporate {
        messages::CORPORATE_EVENT_TYPE_INPUT
    } else {
        messages::EVENT_TYPE_INPUT
    };
    let answer = console.read_line(&format!("{} ", prompt))?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

// =============================================================================
// STAGE 2: BUDGET
// =============================================================================

pub fn collect_budget(console: &mut dyn Console, record: LeadRecord) -> LeadResult<LeadRecord> {
    console.say(messages::BUDGET_QUESTION)?;
    let budget = collect_number(console, messages::BUDGET_PROMPT, 0.0)?;
    record.with_budget(budget)
}

// =============================================================================
// STAGE 3: CONTACT
// =============================================================================

pub fn collect_contact_info(
    console: &mut dyn Console,
    record: LeadRecord,
) -> LeadResult<LeadRecord> {
    console.say(messages::CONTACT_QUESTION)?;
    let name = collect_string(console, messages::NAME_PROMPT, None)?;
    let contact = collect_contact(console)?;
    record.with_contact_info(name, contact)
}

// =============================================================================
// STAGE 4: QUALIFICATION
// =============================================================================

/// Run the gates, show the outcome, and stamp the verdict on the record
pub fn evaluate_qualification(
    console: &mut dyn Console,
    record: LeadRecord,
    min_budget: f64,
) -> LeadResult<(LeadRecord, Qualification)> {
    console.say(messages::EVALUATION_HEADER)?;

    let outcome = qualify(&record, min_budget);
    console.say(&outcome.message())?;

    match outcome.reason() {
        None => {
            info!("lead qualified");
            for line in summary_lines(&record) {
                console.say(&line)?;
            }
            console.say(messages::CONTACT_FOLLOWUP)?;
        }
        Some(reason) => info!(reason = %reason, "lead not qualified"),
    }

    let record = record.with_verdict(outcome.is_qualified())?;
    Ok((record, outcome))
}

/// Summary block shown to a qualified lead
pub fn summary_lines(record: &LeadRecord) -> Vec<String> {
    vec![
        messages::QUALIFIED_SUMMARY.to_string(),
        format!("- Tipo de evento: {}", record.event_type().unwrap_or(NOT_SPECIFIED)),
        format!("- Presupuesto: {} USD", format_budget(record.budget())),
        format!("- Nombre: {}", record.name().unwrap_or(NOT_SPECIFIED)),
        format!(
            "- Contacto: {} ({})",
            record.contact().unwrap_or(NOT_SPECIFIED),
            record.contact_type().map(|t| t.as_str()).unwrap_or(NOT_SPECIFIED)
        ),
    ]
}

// =============================================================================
// STAGE 5: PERSISTENCE
// =============================================================================

/// What happened to the finished lead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Store refused (duplicate) or the write failed
    NotSaved,
    /// Store unreachable or persistence disabled
    Skipped,
}

/// Hand the lead to the store if it is reachable; never fails the conversation
pub async fn save_lead_data(store: Option<&dyn LeadStore>, record: &LeadRecord) -> SaveOutcome {
    let Some(store) = store else {
        debug!("persistence disabled");
        return SaveOutcome::Skipped;
    };

    if !store.is_available().await {
        debug!("lead store unavailable, skipping persistence");
        return SaveOutcome::Skipped;
    }

    if store.save(record).await {
        SaveOutcome::Saved
    } else {
        warn!("lead was not stored");
        SaveOutcome::NotSaved
    }
}

// =============================================================================
// CONVERSATION
// =============================================================================

/// Final state of one conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationOutcome {
    pub record: LeadRecord,
    pub qualification: Qualification,
    pub persistence: SaveOutcome,
}

/// One conversation wired to its collaborators
pub struct Conversation<'a> {
    console: &'a mut dyn Console,
    classifier: &'a dyn EventClassifier,
    store: Option<&'a dyn LeadStore>,
    config: LeadConfig,
}

impl<'a> Conversation<'a> {
    pub fn new(
        console: &'a mut dyn Console,
        classifier: &'a dyn EventClassifier,
        store: Option<&'a dyn LeadStore>,
        config: LeadConfig,
    ) -> Self {
        Self {
            console,
            classifier,
            store,
            config,
        }
    }

    /// Run every stage in order and return the finished record
    pub async fn run(self) -> LeadResult<ConversationOutcome> {
        let Self {
            console,
            classifier,
            store,
            config,
        } = self;

        let record = LeadRecord::new();
        info!(stage = "event_type", "conversation started");
        let record = collect_event_type(console, classifier, record).await?;

        debug!(stage = "budget");
        let record = collect_budget(console, record)?;

        debug!(stage = "contact");
        let record = collect_contact_info(console, record)?;

        debug!(stage = "qualification");
        let (record, qualification) = evaluate_qualification(console, record, config.min_budget)?;

        debug!(stage = "persistence");
        let persistence = save_lead_data(store, &record).await;

        console.say(messages::CONVERSATION_END)?;
        info!(qualified = qualification.is_qualified(), ?persistence, "conversation finished");

        Ok(ConversationOutcome {
            record,
            qualification,
            persistence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::DisabledClassifier;
    use crate::console::ScriptedConsole;
    use crate::contact::ContactType;
    use crate::qualifier::RejectionReason;
    use crate::sheets::InMemoryLeadStore;
    use async_trait::async_trait;

    struct FixedClassifier(Classification);

    #[async_trait]
    impl EventClassifier for FixedClassifier {
        fn is_available(&self) -> bool {
            true
        }

        async fn classify(&self, _description: &str) -> Classification {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_event_type_direct_yes() {
        let mut console = ScriptedConsole::new(["1", "Conferencia anual"]);
        let record = collect_event_type(&mut console, &DisabledClassifier::default(), LeadRecord::new())
            .await
            .unwrap();
        assert_eq!(record.is_corporate(), Some(true));
        assert_eq!(record.event_type(), Some("Conferencia anual"));
        assert!(console.saw(messages::CORPORATE_EVENT_TYPE_INPUT));
    }

    #[tokio::test]
    async fn test_event_type_direct_no_blank_type() {
        let mut console = ScriptedConsole::new(["no", ""]);
        let record = collect_event_type(&mut console, &DisabledClassifier::default(), LeadRecord::new())
            .await
            .unwrap();
        assert_eq!(record.is_corporate(), Some(false));
        assert_eq!(record.event_type(), None);
    }

    #[tokio::test]
    async fn test_event_type_from_classifier() {
        let classifier = FixedClassifier(Classification::corporate("Corporative"));
        let mut console = ScriptedConsole::new(["3", "Congreso de ventas"]);
        let record = collect_event_type(&mut console, &classifier, LeadRecord::new())
            .await
            .unwrap();
        assert_eq!(record.is_corporate(), Some(true));
        assert_eq!(record.event_type(), Some("Corporative"));
        assert!(console.saw(messages::DESCRIPTION_CORPORATE));
        assert!(!console.saw(messages::MANUAL_CORPORATE_QUESTION));
    }

    #[tokio::test]
    async fn test_classifier_without_event_type_defaults() {
        let classifier = FixedClassifier(Classification {
            is_corporate: Some(false),
            event_type: None,
        });
        let mut console = ScriptedConsole::new(["d", "Algo"]);
        let record = collect_event_type(&mut console, &classifier, LeadRecord::new())
            .await
            .unwrap();
        assert_eq!(record.event_type(), Some(NOT_SPECIFIED));
        assert!(console.saw(messages::DESCRIPTION_NOT_CORPORATE));
    }

    #[tokio::test]
    async fn test_unavailable_classifier_falls_back_to_manual() {
        let mut console = ScriptedConsole::new(["3", "Fiesta de empresa", "SÍ", "Cena de gala"]);
        let record = collect_event_type(&mut console, &DisabledClassifier::default(), LeadRecord::new())
            .await
            .unwrap();
        assert_eq!(record.is_corporate(), Some(true));
        assert_eq!(record.event_type(), Some("Cena de gala"));
        assert!(console.saw(messages::CLASSIFIER_UNAVAILABLE));
        assert!(!console.saw(messages::ANALYZING_DESCRIPTION));
    }

    #[tokio::test]
    async fn test_failed_classification_falls_back_to_manual() {
        let classifier = FixedClassifier(Classification::unknown());
        let mut console = ScriptedConsole::new(["3", "Boda", "n", "Boda"]);
        let record = collect_event_type(&mut console, &classifier, LeadRecord::new())
            .await
            .unwrap();
        assert_eq!(record.is_corporate(), Some(false));
        assert_eq!(record.event_type(), Some("Boda"));
        assert!(console.saw(messages::ANALYZING_DESCRIPTION));
        assert!(console.saw(messages::MANUAL_CORPORATE_QUESTION));
    }

    #[test]
    fn test_budget_stage() {
        let mut console = ScriptedConsole::new(["abc", "-1", "1500"]);
        let record = collect_budget(&mut console, LeadRecord::new()).unwrap();
        assert_eq!(record.budget(), Some(1500.0));
        assert!(console.saw(messages::BUDGET_QUESTION));
    }

    #[test]
    fn test_contact_stage() {
        let mut console = ScriptedConsole::new(["Ana", "not-an-email", "ana@ex.com "]);
        let record = collect_contact_info(&mut console, LeadRecord::new()).unwrap();
        assert_eq!(record.name(), Some("Ana"));
        assert_eq!(record.contact(), Some("ana@ex.com"));
        assert_eq!(record.contact_type(), Some(ContactType::Email));
    }

    #[test]
    fn test_evaluation_prints_single_rejection() {
        let record = LeadRecord::new().with_event(false, None).unwrap();
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let (record, outcome) = evaluate_qualification(&mut console, record, 1000.0).unwrap();

        assert_eq!(record.qualified(), Some(false));
        assert_eq!(outcome.reason(), Some(RejectionReason::NotCorporate));
        assert_eq!(console.transcript(), [messages::EVALUATION_HEADER, messages::NOT_CORPORATE]);
    }

    #[tokio::test]
    async fn test_save_skips_unavailable_store() {
        let store = InMemoryLeadStore::unavailable();
        let outcome = save_lead_data(Some(&store), &LeadRecord::new()).await;
        assert_eq!(outcome, SaveOutcome::Skipped);
        assert_eq!(save_lead_data(None, &LeadRecord::new()).await, SaveOutcome::Skipped);
    }
}
