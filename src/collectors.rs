//! Interactive collectors
//!
//! Each collector re-prompts until the answer satisfies its predicate.
//! There is no retry limit; only a closed input ends the loop early.
//! The parsing rules live in small pure functions so they can be tested
//! without a console.

use tracing::debug;

use crate::console::Console;
use crate::contact::{detect_contact_type, Contact};
use crate::error::LeadResult;
use crate::messages;

/// Why a numeric answer was refused
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberRejection {
    /// Not a finite decimal number
    NotANumber,
    /// Parsed, but below the configured floor
    BelowMinimum { min: f64 },
}

impl NumberRejection {
    pub fn message(&self) -> String {
        match self {
            NumberRejection::NotANumber => messages::INVALID_NUMBER.to_string(),
            NumberRejection::BelowMinimum { min } => messages::min_value(*min),
        }
    }
}

/// Parse a numeric answer with a floor
pub fn parse_number(raw: &str, min_value: f64) -> Result<f64, NumberRejection> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| NumberRejection::NotANumber)?;

    if !value.is_finite() {
        return Err(NumberRejection::NotANumber);
    }

    if value < min_value {
        return Err(NumberRejection::BelowMinimum { min: min_value });
    }

    Ok(value)
}

/// Match an answer against accepted tokens; returns the matched token
///
/// Case-insensitive matching returns the lower-cased form.
pub fn match_choice(raw: &str, choices: &[&str], case_sensitive: bool) -> Option<String> {
    let value = raw.trim();
    if case_sensitive {
        choices
            .iter()
            .find(|c| **c == value)
            .map(|c| c.to_string())
    } else {
        let value = value.to_lowercase();
        choices
            .iter()
            .map(|c| c.to_lowercase())
            .find(|c| *c == value)
    }
}

/// First-level answer to "is your event corporate?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteChoice {
    Yes,
    No,
    Describe,
}

const YES_TOKENS: [&str; 5] = ["1", "sí", "si", "yes", "y"];
const NO_TOKENS: [&str; 3] = ["2", "no", "n"];
const DESCRIBE_TOKENS: [&str; 4] = ["3", "describir", "describe", "d"];

/// Tokens accepted by the manual corporate yes/no question
pub const MANUAL_CHOICES: [&str; 5] = ["sí", "si", "yes", "no", "n"];
const MANUAL_AFFIRMATIVE: [&str; 3] = ["sí", "si", "yes"];

pub fn parse_route_choice(raw: &str) -> Option<RouteChoice> {
    let value = raw.trim().to_lowercase();
    if YES_TOKENS.contains(&value.as_str()) {
        Some(RouteChoice::Yes)
    } else if NO_TOKENS.contains(&value.as_str()) {
        Some(RouteChoice::No)
    } else if DESCRIBE_TOKENS.contains(&value.as_str()) {
        Some(RouteChoice::Describe)
    } else {
        None
    }
}

/// Whether a manual-classification answer means "corporate"
pub fn is_affirmative(choice: &str) -> bool {
    MANUAL_AFFIRMATIVE.contains(&choice.to_lowercase().as_str())
}

/// Resolved event route, with the description when the user chose to describe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRoute {
    Corporate,
    NonCorporate,
    Describe(String),
}

/// Collect a non-empty (trimmed) string, optionally checked by `validator`
pub fn collect_string(
    console: &mut dyn Console,
    prompt: &str,
    validator: Option<&dyn Fn(&str) -> bool>,
) -> LeadResult<String> {
    loop {
        let raw = console.read_line(&format!("{}: ", prompt))?;
        let value = raw.trim();
        if !value.is_empty() && validator.map_or(true, |check| check(value)) {
            return Ok(value.to_string());
        }
        debug!(prompt, "rejected string answer");
        console.say(messages::INVALID_INPUT)?;
    }
}

/// Collect a finite number that is at least `min_value`
pub fn collect_number(console: &mut dyn Console, prompt: &str, min_value: f64) -> LeadResult<f64> {
    loop {
        let raw = console.read_line(&format!("{}: ", prompt))?;
        match parse_number(&raw, min_value) {
            Ok(value) => return Ok(value),
            Err(rejection) => {
                debug!(prompt, ?rejection, "rejected numeric answer");
                console.say(&rejection.message())?;
            }
        }
    }
}

/// Collect one of `choices`
pub fn collect_choice(
    console: &mut dyn Console,
    prompt: &str,
    choices: &[&str],
    case_sensitive: bool,
) -> LeadResult<String> {
    loop {
        let raw = console.read_line(&format!("{}: ", prompt))?;
        if let Some(choice) = match_choice(&raw, choices, case_sensitive) {
            return Ok(choice);
        }
        let shown: Vec<String> = if case_sensitive {
            choices.iter().map(|c| c.to_string()).collect()
        } else {
            choices.iter().map(|c| c.to_lowercase()).collect()
        };
        console.say(&messages::invalid_choice(&shown))?;
    }
}

/// Ask whether the event is corporate: yes, no, or describe it in free text
pub fn collect_event_route(console: &mut dyn Console) -> LeadResult<EventRoute> {
    console.say(messages::EVENT_ROUTE_QUESTION)?;
    for option in messages::EVENT_ROUTE_OPTIONS {
        console.say(option)?;
    }

    loop {
        let raw = console.read_line(&format!("{}: ", messages::EVENT_ROUTE_PROMPT))?;
        match parse_route_choice(&raw) {
            Some(RouteChoice::Yes) => return Ok(EventRoute::Corporate),
            Some(RouteChoice::No) => return Ok(EventRoute::NonCorporate),
            Some(RouteChoice::Describe) => {
                let description =
                    console.read_line(&format!("{}: ", messages::DESCRIBE_PROMPT))?;
                let description = description.trim();
                if !description.is_empty() {
                    return Ok(EventRoute::Describe(description.to_string()));
                }
                console.say(messages::DESCRIBE_EMPTY)?;
            }
            None => console.say(messages::EVENT_ROUTE_INVALID)?,
        }
    }
}

/// Collect an email or phone number, detecting which it is
pub fn collect_contact(console: &mut dyn Console) -> LeadResult<Contact> {
    loop {
        let raw = console.read_line(&format!("{}: ", messages::CONTACT_PROMPT))?;
        if let Some(contact) = detect_contact_type(&raw).into_contact() {
            debug!(contact_type = %contact.kind(), "contact detected");
            return Ok(contact);
        }
        console.say(messages::INVALID_CONTACT)?;
    }
}
