//! Error types for the lead qualification flow
//!
//! Two families: `LeadError` for the conversation itself (console I/O,
//! record invariants, configuration) and `CollaboratorError` for the
//! remote classifier and spreadsheet store. Collaborator errors are never
//! surfaced to the user; the flow degrades instead.

use thiserror::Error;

/// Conversation-level failure
#[derive(Error, Debug)]
pub enum LeadError {
    #[error("Console I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input closed while waiting for an answer to '{prompt}'")]
    InputClosed { prompt: String },

    #[error("Field '{field}' is already set on this lead")]
    FieldAlreadySet { field: &'static str },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl LeadError {
    pub fn config(message: impl Into<String>) -> Self {
        LeadError::Config {
            message: message.into(),
        }
    }
}

/// Failure talking to an external collaborator (classifier or store)
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Collaborator unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Authentication error: {message}")]
    Auth { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },
}

impl CollaboratorError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        CollaboratorError::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        CollaboratorError::MalformedResponse {
            message: message.into(),
        }
    }

    /// True for failures caused by the network rather than the remote
    /// service's answer (timeouts, refused connections).
    pub fn is_transport(&self) -> bool {
        matches!(self, CollaboratorError::Http(e) if e.is_timeout() || e.is_connect())
    }
}

/// Result alias for conversation operations
pub type LeadResult<T> = std::result::Result<T, LeadError>;

/// Result alias for collaborator calls
pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;
