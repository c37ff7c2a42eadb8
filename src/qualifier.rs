//! Lead qualification
//!
//! Four ordered gates, checked in sequence; the first failing gate decides
//! the outcome and is the only reason reported. Pure: depends on nothing
//! but the record and the minimum budget.

use std::fmt;

use crate::lead::LeadRecord;
use crate::messages;

/// The gate that blocked a lead
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectionReason {
    NotCorporate,
    InsufficientBudget { min_budget: f64 },
    MissingName,
    MissingContact,
}

impl RejectionReason {
    /// Localized message shown to the user
    pub fn message(&self) -> String {
        match self {
            RejectionReason::NotCorporate => messages::NOT_CORPORATE.to_string(),
            RejectionReason::InsufficientBudget { min_budget } => {
                messages::insufficient_budget(*min_budget)
            }
            RejectionReason::MissingName => messages::MISSING_NAME.to_string(),
            RejectionReason::MissingContact => messages::MISSING_CONTACT.to_string(),
        }
    }

    /// Stable identifier for logs
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::NotCorporate => "not_corporate",
            RejectionReason::InsufficientBudget { .. } => "insufficient_budget",
            RejectionReason::MissingName => "missing_name",
            RejectionReason::MissingContact => "missing_contact",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Outcome of the four-gate check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Qualification {
    Qualified,
    Rejected(RejectionReason),
}

impl Qualification {
    pub fn is_qualified(&self) -> bool {
        matches!(self, Qualification::Qualified)
    }

    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            Qualification::Qualified => None,
            Qualification::Rejected(reason) => Some(*reason),
        }
    }

    /// The single line shown to the user for this outcome
    pub fn message(&self) -> String {
        match self {
            Qualification::Qualified => messages::QUALIFIED_SUCCESS.to_string(),
            Qualification::Rejected(reason) => reason.message(),
        }
    }
}

/// Apply the gates in order: corporate, budget, name, contact
pub fn qualify(record: &LeadRecord, min_budget: f64) -> Qualification {
    if record.is_corporate() != Some(true) {
        return Qualification::Rejected(RejectionReason::NotCorporate);
    }

    match record.budget() {
        Some(budget) if budget >= min_budget => {}
        _ => return Qualification::Rejected(RejectionReason::InsufficientBudget { min_budget }),
    }

    if record.name().map_or(true, |n| n.trim().is_empty()) {
        return Qualification::Rejected(RejectionReason::MissingName);
    }

    if record.contact().map_or(true, |c| c.trim().is_empty()) {
        return Qualification::Rejected(RejectionReason::MissingContact);
    }

    Qualification::Qualified
}
