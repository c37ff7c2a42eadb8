//! Lead persistence
//!
//! `LeadStore` is the gateway the conversation hands finished leads to.
//! Stores refuse duplicates (same contact value and type) on their own;
//! the caller treats a `false` from `save` as non-fatal.

pub mod client;
pub mod credentials;
pub mod row;

#[cfg(test)]
pub(crate) mod test_server;

use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;
use std::sync::Mutex;
use tracing::info;

pub use client::{SheetsConfig, SheetsStore};

use crate::lead::LeadRecord;

/// Diagnostic view of a store's readiness
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub service_initialized: bool,
    pub spreadsheet_id_available: bool,
    pub sheet_name_available: bool,
    pub fully_available: bool,
    pub error_message: Option<String>,
}

/// Append-only destination for finished leads
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Whether a save can be attempted now
    async fn is_available(&self) -> bool;

    /// Store the lead; false when it is a duplicate or the write failed
    async fn save(&self, record: &LeadRecord) -> bool;

    async fn status(&self) -> StoreStatus;
}

/// Store that keeps rows in memory, used for tests and dry runs
#[derive(Debug)]
pub struct InMemoryLeadStore {
    available: bool,
    values: Mutex<Vec<Vec<String>>>,
}

impl Default for InMemoryLeadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self {
            available: true,
            values: Mutex::new(vec![row::header_row()]),
        }
    }

    /// A store that reports itself unreachable and never writes
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Stored data rows (header excluded)
    pub fn rows(&self) -> Vec<Vec<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.iter().skip(1).cloned().collect()
    }

    pub fn lead_count(&self) -> usize {
        self.rows().len()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn save(&self, record: &LeadRecord) -> bool {
        if !self.available {
            return false;
        }
        let (Some(contact), Some(contact_type)) = (record.contact(), record.contact_type()) else {
            return false;
        };

        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        if row::is_duplicate(&values, contact, contact_type.as_str()) {
            info!(%contact_type, "lead already stored, skipping duplicate");
            return false;
        }
        values.push(row::prepare_row(record, Local::now().naive_local()));
        true
    }

    async fn status(&self) -> StoreStatus {
        StoreStatus {
            service_initialized: true,
            spreadsheet_id_available: true,
            sheet_name_available: true,
            fully_available: self.available,
            error_message: (!self.available).then(|| "In-memory store disabled".to_string()),
        }
    }
}
