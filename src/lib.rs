//! Lead qualification for event inquiries
//!
//! A short scripted conversation collects whether the event is corporate,
//! the budget, and a name with an email or phone number. The finished lead
//! is run through four ordered gates and, when a store is reachable,
//! appended to a spreadsheet.
//!
//! ## Layout
//!
//! - `lead`: the record each stage extends
//! - `contact`: email / phone detection and normalization
//! - `collectors`: re-prompting input helpers over a [`console::Console`]
//! - `classifier`: LLM-backed corporate-event classification
//! - `qualifier`: the pure qualification gates
//! - `sheets`: lead persistence (Google Sheets or in memory)
//! - `pipeline`: the conversation itself

pub mod classifier;
pub mod collectors;
pub mod config;
pub mod console;
pub mod contact;
pub mod error;
pub mod lead;
pub mod messages;
pub mod pipeline;
pub mod qualifier;
pub mod sheets;

pub use classifier::{build_classifier, Classification, ClassifierConfig, EventClassifier};
pub use config::LeadConfig;
pub use console::{Console, ScriptedConsole, StdConsole};
pub use contact::{detect_contact_type, Contact, ContactDetection, ContactType};
pub use error::{CollaboratorError, LeadError, LeadResult};
pub use lead::LeadRecord;
pub use pipeline::{Conversation, ConversationOutcome, SaveOutcome};
pub use qualifier::{qualify, Qualification, RejectionReason};
pub use sheets::{InMemoryLeadStore, LeadStore, SheetsConfig, SheetsStore};
