//! Lead record
//!
//! One record per conversation. Each stage consumes the record and returns
//! a new one with its own fields filled in; a field that is already set
//! cannot be written again.

use serde::Serialize;

use crate::contact::{Contact, ContactType};
use crate::error::{LeadError, LeadResult};

/// Information gathered about a prospective customer plus the final verdict
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeadRecord {
    is_corporate: Option<bool>,
    event_type: Option<String>,
    budget: Option<f64>,
    name: Option<String>,
    #[serde(flatten)]
    contact: Option<Contact>,
    qualified: Option<bool>,
}

impl LeadRecord {
    /// Empty record at the start of a conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Event-type stage output
    pub fn with_event(self, is_corporate: bool, event_type: Option<String>) -> LeadResult<Self> {
        ensure_unset("is_corporate", &self.is_corporate)?;
        ensure_unset("event_type", &self.event_type)?;
        let event_type = event_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(Self {
            is_corporate: Some(is_corporate),
            event_type,
            ..self
        })
    }

    /// Budget stage output
    pub fn with_budget(self, budget: f64) -> LeadResult<Self> {
        ensure_unset("budget", &self.budget)?;
        if !budget.is_finite() || budget < 0.0 {
            return Err(LeadError::InvalidField {
                field: "budget",
                reason: format!("must be a non-negative number, got {}", budget),
            });
        }
        Ok(Self {
            budget: Some(budget),
            ..self
        })
    }

    /// Contact stage output
    pub fn with_contact_info(self, name: impl Into<String>, contact: Contact) -> LeadResult<Self> {
        ensure_unset("name", &self.name)?;
        ensure_unset("contact", &self.contact)?;
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(LeadError::InvalidField {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(Self {
            name: Some(name),
            contact: Some(contact),
            ..self
        })
    }

    /// Qualifier stage output
    pub fn with_verdict(self, qualified: bool) -> LeadResult<Self> {
        ensure_unset("qualified", &self.qualified)?;
        Ok(Self {
            qualified: Some(qualified),
            ..self
        })
    }

    pub fn is_corporate(&self) -> Option<bool> {
        self.is_corporate
    }

    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    pub fn budget(&self) -> Option<f64> {
        self.budget
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn contact(&self) -> Option<&str> {
        self.contact.as_ref().map(Contact::value)
    }

    pub fn contact_type(&self) -> Option<ContactType> {
        self.contact.as_ref().map(Contact::kind)
    }

    pub fn qualified(&self) -> Option<bool> {
        self.qualified
    }

    /// All inputs the qualifier looks at have been gathered
    pub fn is_ready_for_qualification(&self) -> bool {
        self.is_corporate.is_some()
            && self.budget.is_some()
            && self.name.is_some()
            && self.contact.is_some()
    }
}

fn ensure_unset<T>(field: &'static str, value: &Option<T>) -> LeadResult<()> {
    match value {
        Some(_) => Err(LeadError::FieldAlreadySet { field }),
        None => Ok(()),
    }
}
