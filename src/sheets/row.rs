//! Spreadsheet row layout
//!
//! Pure helpers shared by every `LeadStore`: header row, record
//! serialization, duplicate detection over already-stored rows.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use crate::lead::LeadRecord;
use crate::messages::{format_thousands, NOT_SPECIFIED};

/// Column headers, in write order
pub const HEADERS: [&str; 8] = [
    "Es Corporativo",
    "Tipo de Evento",
    "Presupuesto",
    "Nombre",
    "Contacto",
    "Tipo de Contacto",
    "Calificado",
    "Fecha de Registro",
];

pub const COLUMN_COUNT: usize = HEADERS.len();

/// Timestamp column format
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialize a lead into one row, stamped with `registered_at`
pub fn prepare_row(record: &LeadRecord, registered_at: NaiveDateTime) -> Vec<String> {
    vec![
        yes_no(record.is_corporate()),
        text_or_unspecified(record.event_type()),
        format_budget(record.budget()),
        text_or_unspecified(record.name()),
        text_or_unspecified(record.contact()),
        record
            .contact_type()
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        yes_no(record.qualified()),
        registered_at.format(TIMESTAMP_FORMAT).to_string(),
    ]
}

/// `$1,500.00`; absent budget is "No especificado"
pub fn format_budget(budget: Option<f64>) -> String {
    match budget {
        Some(value) => format!("${}", format_thousands(value, 2)),
        None => NOT_SPECIFIED.to_string(),
    }
}

fn yes_no(flag: Option<bool>) -> String {
    let label = if flag == Some(true) { "Sí" } else { "No" };
    label.to_string()
}

fn text_or_unspecified(text: Option<&str>) -> String {
    text.filter(|t| !t.is_empty())
        .unwrap_or(NOT_SPECIFIED)
        .to_string()
}

/// Locate the contact value and contact type columns in a header row
pub fn contact_columns(headers: &[String]) -> Option<(usize, usize)> {
    let mut contact_col = None;
    let mut contact_type_col = None;

    for (i, header) in headers.iter().enumerate() {
        if header.contains("Contacto") && !header.contains("Tipo") {
            contact_col = Some(i);
        } else if header.contains("Tipo de Contacto") {
            contact_type_col = Some(i);
        }
    }

    Some((contact_col?, contact_type_col?))
}

/// Whether `values` (header row first) already holds this contact
///
/// Exact string comparison on both columns.
pub fn is_duplicate(values: &[Vec<String>], contact: &str, contact_type: &str) -> bool {
    let Some((headers, data_rows)) = values.split_first() else {
        return false;
    };
    let Some((contact_col, type_col)) = contact_columns(headers) else {
        return false;
    };

    data_rows.iter().any(|row| {
        row.get(contact_col).map(String::as_str) == Some(contact)
            && row.get(type_col).map(String::as_str) == Some(contact_type)
    })
}

/// 1-based row index for the next append
pub fn next_row(values: &[Vec<String>]) -> usize {
    if values.is_empty() {
        2
    } else {
        values.len() + 1
    }
}

/// Data rows as header-keyed maps; missing trailing cells become ""
pub fn rows_to_records(values: &[Vec<String>]) -> Vec<BTreeMap<String, String>> {
    let Some((headers, data_rows)) = values.split_first() else {
        return Vec::new();
    };

    data_rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}

pub fn header_row() -> Vec<String> {
    HEADERS.iter().map(|h| h.to_string()).collect()
}
