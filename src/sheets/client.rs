//! Google Sheets lead store
//!
//! Talks to the Sheets REST API (v4) directly. Connection problems never
//! escape: the store reports itself unavailable and `save` returns false.

use async_trait::async_trait;
use chrono::{Local, Utc};
use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::credentials::AuthorizedUserToken;
use super::row::{self, COLUMN_COUNT};
use super::{LeadStore, StoreStatus};
use crate::config::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::error::{CollaboratorError, CollaboratorResult};
use crate::lead::LeadRecord;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TOKEN_PATH: &str = "credentials/token.json";

/// Spreadsheet store settings
#[derive(Debug, Clone, PartialEq)]
pub struct SheetsConfig {
    pub spreadsheet_id: Option<String>,
    pub token_path: PathBuf,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            api_base: SHEETS_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl SheetsConfig {
    /// LEAD_SHEETS_SPREADSHEET_ID / LEAD_SHEETS_TOKEN_PATH
    pub fn from_env(timeout: Duration) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), timeout)
    }

    pub fn from_lookup<F>(lookup: F, timeout: Duration) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            spreadsheet_id: non_blank("LEAD_SHEETS_SPREADSHEET_ID"),
            token_path: non_blank("LEAD_SHEETS_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH)),
            api_base: SHEETS_API_BASE.to_string(),
            timeout,
        }
    }
}

/// Mutable connection state guarded by the store's mutex
#[derive(Debug, Default)]
struct Session {
    token: Option<AuthorizedUserToken>,
    sheet_title: Option<String>,
    sheet_id: Option<i64>,
    last_error: Option<String>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Lead store backed by a Google spreadsheet
pub struct SheetsStore {
    http: Client,
    config: SheetsConfig,
    session: Mutex<Session>,
}

impl SheetsStore {
    /// Load credentials, find the first sheet and make sure headers exist
    ///
    /// Never fails; problems leave the store unavailable with the reason in `status()`.
    pub async fn connect(config: SheetsConfig) -> Self {
        let http = match Client::builder().timeout(config.timeout).build() {
            Ok(http) => http,
            Err(e) => {
                warn!("spreadsheet HTTP client unavailable: {}", e);
                Client::new()
            }
        };

        let store = Self {
            http,
            config,
            session: Mutex::new(Session::default()),
        };

        if let Err(e) = store.initialize().await {
            warn!("spreadsheet store unavailable: {}", e);
            store.session.lock().await.last_error = Some(e.to_string());
        }
        store
    }

    async fn initialize(&self) -> CollaboratorResult<()> {
        let spreadsheet_id = self.spreadsheet_id()?.to_string();

        let token = AuthorizedUserToken::load(&self.config.token_path).map_err(|e| {
            CollaboratorError::unavailable(format!(
                "cannot read token file {}: {}",
                self.config.token_path.display(),
                e
            ))
        })?;

        let mut session = self.session.lock().await;
        session.token = Some(token);
        self.ensure_valid_token(&mut session).await?;

        let raw = self
            .request(&session, Method::GET, &["v4", "spreadsheets", &spreadsheet_id], &[], None)
            .await?;
        let meta: SpreadsheetMeta = serde_json::from_value(raw)?;

        let first = meta
            .sheets
            .into_iter()
            .next()
            .ok_or_else(|| CollaboratorError::unavailable("spreadsheet has no sheets"))?;

        info!(sheet = %first.properties.title, "spreadsheet store connected");
        session.sheet_title = Some(first.properties.title);
        session.sheet_id = Some(first.properties.sheet_id);

        if let Err(e) = self.ensure_headers(&session).await {
            warn!("could not prepare header row: {}", e);
        }
        Ok(())
    }

    fn spreadsheet_id(&self) -> CollaboratorResult<&str> {
        self.config
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| CollaboratorError::unavailable("LEAD_SHEETS_SPREADSHEET_ID not set"))
    }

    /// Refresh the access token if needed, rewriting the token file
    async fn ensure_valid_token(&self, session: &mut Session) -> CollaboratorResult<()> {
        let token = session
            .token
            .as_mut()
            .ok_or_else(|| CollaboratorError::unavailable("no credentials loaded"))?;

        if token.is_valid_at(Utc::now()) {
            return Ok(());
        }

        if !token.can_refresh() {
            return Err(CollaboratorError::Auth {
                message: "access token expired and cannot be refreshed".to_string(),
            });
        }

        token.refresh(&self.http).await?;
        if let Err(e) = token.save(&self.config.token_path) {
            warn!("refreshed token could not be written back: {}", e);
        }
        Ok(())
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> CollaboratorResult<Url> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| CollaboratorError::unavailable(format!("bad API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| CollaboratorError::unavailable("API base URL cannot hold a path"))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn request(
        &self,
        session: &Session,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> CollaboratorResult<Value> {
        let token = session
            .token
            .as_ref()
            .ok_or_else(|| CollaboratorError::unavailable("no credentials loaded"))?
            .access_token()?;

        let url = self.url(segments, query)?;
        debug!(%method, %url, "sheets request");

        let mut builder = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(response.json().await?)
    }

    async fn read_values(&self, session: &Session, cells: &str) -> CollaboratorResult<Vec<Vec<String>>> {
        let spreadsheet_id = self.spreadsheet_id()?;
        let title = session
            .sheet_title
            .as_deref()
            .ok_or_else(|| CollaboratorError::unavailable("sheet not detected"))?;
        let range = a1_range(title, cells);

        let value = self
            .request(
                session,
                Method::GET,
                &["v4", "spreadsheets", spreadsheet_id, "values", &range],
                &[],
                None,
            )
            .await?;
        let range: ValueRange = serde_json::from_value(value)?;
        Ok(range.values.into_iter().map(cells_to_strings).collect())
    }

    async fn write_row(&self, session: &Session, cells: &str, row: Vec<String>) -> CollaboratorResult<()> {
        let spreadsheet_id = self.spreadsheet_id()?;
        let title = session
            .sheet_title
            .as_deref()
            .ok_or_else(|| CollaboratorError::unavailable("sheet not detected"))?;
        let range = a1_range(title, cells);

        self.request(
            session,
            Method::PUT,
            &["v4", "spreadsheets", spreadsheet_id, "values", &range],
            &[("valueInputOption", "RAW")],
            Some(json!({ "values": [row] })),
        )
        .await?;
        Ok(())
    }

    /// Write and style the header row when row 1 is empty
    async fn ensure_headers(&self, session: &Session) -> CollaboratorResult<()> {
        let existing = self.read_values(session, "A1:H1").await?;
        if existing.first().is_some_and(|row| !row.is_empty()) {
            return Ok(());
        }

        self.write_row(session, "A1:H1", row::header_row()).await?;
        info!("wrote spreadsheet header row");

        let sheet_id = session.sheet_id.unwrap_or(0);
        let spreadsheet_id = self.spreadsheet_id()?;
        let batch = format!("{}:batchUpdate", spreadsheet_id);
        self.request(
            session,
            Method::POST,
            &["v4", "spreadsheets", &batch],
            &[],
            Some(header_format_request(sheet_id)),
        )
        .await?;
        Ok(())
    }

    async fn try_save(&self, record: &LeadRecord) -> CollaboratorResult<bool> {
        let (Some(contact), Some(contact_type)) = (record.contact(), record.contact_type()) else {
            return Err(CollaboratorError::unavailable("lead has no contact to key on"));
        };

        let mut session = self.session.lock().await;
        self.ensure_valid_token(&mut session).await?;

        let values = self.read_values(&session, "A:H").await?;
        if row::is_duplicate(&values, contact, contact_type.as_str()) {
            info!(%contact_type, "lead already stored, skipping duplicate");
            return Ok(false);
        }

        let next = row::next_row(&values);
        let row = row::prepare_row(record, Local::now().naive_local());
        self.write_row(&session, &format!("A{next}:H{next}"), row).await?;
        info!(row = next, "lead stored");
        Ok(true)
    }

    /// Number of stored leads (header excluded); 0 when unavailable
    pub async fn lead_count(&self) -> usize {
        if !self.is_available().await {
            return 0;
        }
        let session = self.session.lock().await;
        match self.read_values(&session, "A:H").await {
            Ok(values) => values.len().saturating_sub(1),
            Err(e) => {
                warn!("could not count leads: {}", e);
                0
            }
        }
    }

    /// All stored leads keyed by header; empty when unavailable
    pub async fn all_leads(&self) -> Vec<BTreeMap<String, String>> {
        if !self.is_available().await {
            return Vec::new();
        }
        let session = self.session.lock().await;
        match self.read_values(&session, "A:H").await {
            Ok(values) => row::rows_to_records(&values),
            Err(e) => {
                warn!("could not read leads: {}", e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl LeadStore for SheetsStore {
    async fn is_available(&self) -> bool {
        if self.config.spreadsheet_id.is_none() {
            return false;
        }
        let mut session = self.session.lock().await;
        if session.token.is_none() || session.sheet_title.is_none() {
            return false;
        }
        match self.ensure_valid_token(&mut session).await {
            Ok(()) => true,
            Err(e) => {
                warn!("spreadsheet credentials no longer valid: {}", e);
                session.last_error = Some(e.to_string());
                false
            }
        }
    }

    async fn save(&self, record: &LeadRecord) -> bool {
        match self.try_save(record).await {
            Ok(written) => written,
            Err(e) => {
                warn!(transport = e.is_transport(), "saving lead failed: {}", e);
                false
            }
        }
    }

    async fn status(&self) -> StoreStatus {
        let fully_available = self.is_available().await;
        let session = self.session.lock().await;
        let service_initialized = session.token.is_some();
        let spreadsheet_id_available = self.config.spreadsheet_id.is_some();
        let sheet_name_available = session.sheet_title.is_some();

        let error_message = if fully_available {
            None
        } else if let Some(err) = &session.last_error {
            Some(err.clone())
        } else if !spreadsheet_id_available {
            Some("Spreadsheet ID not set. Define LEAD_SHEETS_SPREADSHEET_ID.".to_string())
        } else if !service_initialized {
            Some("Google Sheets credentials not loaded. Check the token file.".to_string())
        } else if !sheet_name_available {
            Some("Sheet name not detected. Check spreadsheet access.".to_string())
        } else {
            Some("Unknown initialization error.".to_string())
        };

        StoreStatus {
            service_initialized,
            spreadsheet_id_available,
            sheet_name_available,
            fully_available,
            error_message,
        }
    }
}

/// `'Sheet Name'!A1:H1`, quoting the title and doubling embedded quotes
pub fn a1_range(sheet_title: &str, cells: &str) -> String {
    format!("'{}'!{}", sheet_title.replace('\'', "''"), cells)
}

fn cells_to_strings(row: Vec<Value>) -> Vec<String> {
    row.into_iter()
        .map(|cell| match cell {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect()
}

/// Bold white text on blue, centered, across the header columns
fn header_format_request(sheet_id: i64) -> Value {
    json!({
        "requests": [{
            "repeatCell": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": 0,
                    "endRowIndex": 1,
                    "startColumnIndex": 0,
                    "endColumnIndex": COLUMN_COUNT
                },
                "cell": {
                    "userEnteredFormat": {
                        "backgroundColor": {"red": 0.2, "green": 0.4, "blue": 0.8},
                        "textFormat": {
                            "foregroundColor": {"red": 1.0, "green": 1.0, "blue": 1.0},
                            "fontSize": 12,
                            "bold": true
                        },
                        "horizontalAlignment": "CENTER"
                    }
                },
                "fields": "userEnteredFormat(backgroundColor,textFormat,horizontalAlignment)"
            }
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::Contact;
    use crate::sheets::test_server::CannedServer;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_from_lookup() {
        let config = SheetsConfig::from_lookup(
            lookup_from(&[
                ("LEAD_SHEETS_SPREADSHEET_ID", "abc123"),
                ("LEAD_SHEETS_TOKEN_PATH", "/tmp/token.json"),
            ]),
            Duration::from_secs(7),
        );
        assert_eq!(config.spreadsheet_id.as_deref(), Some("abc123"));
        assert_eq!(config.token_path, PathBuf::from("/tmp/token.json"));
        assert_eq!(config.timeout, Duration::from_secs(7));

        let config = SheetsConfig::from_lookup(lookup_from(&[]), Duration::from_secs(7));
        assert_eq!(config.spreadsheet_id, None);
        assert_eq!(config.token_path, PathBuf::from(DEFAULT_TOKEN_PATH));
    }

    #[test]
    fn test_a1_range_quotes_titles() {
        assert_eq!(a1_range("Leads", "A:H"), "'Leads'!A:H");
        assert_eq!(a1_range("Ana's leads", "A1:H1"), "'Ana''s leads'!A1:H1");
    }

    #[test]
    fn test_cells_to_strings() {
        let row = vec![json!("Sí"), json!(1500), Value::Null, json!(true)];
        assert_eq!(cells_to_strings(row), vec!["Sí", "1500", "", "true"]);
    }

    #[test]
    fn test_header_format_covers_all_columns() {
        let request = header_format_request(42);
        let range = &request["requests"][0]["repeatCell"]["range"];
        assert_eq!(range["sheetId"], 42);
        assert_eq!(range["endColumnIndex"], 8);
    }

    #[tokio::test]
    async fn test_url_encodes_range_segment() {
        let store = SheetsStore::connect(SheetsConfig::default()).await;
        let url = store
            .url(&["v4", "spreadsheets", "abc", "values", "'My Leads'!A:H"], &[("valueInputOption", "RAW")])
            .unwrap();
        assert!(url.as_str().starts_with("https://sheets.googleapis.com/v4/spreadsheets/abc/values/"));
        assert!(url.as_str().contains("My%20Leads"));
        assert!(url.as_str().ends_with("?valueInputOption=RAW"));
    }

    #[tokio::test]
    async fn test_missing_spreadsheet_id_is_unavailable() {
        let store = SheetsStore::connect(SheetsConfig::default()).await;
        assert!(!store.is_available().await);

        let status = store.status().await;
        assert!(!status.fully_available);
        assert!(!status.spreadsheet_id_available);
        assert!(status.error_message.unwrap().contains("LEAD_SHEETS_SPREADSHEET_ID"));
    }

    #[tokio::test]
    async fn test_missing_token_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let config = SheetsConfig {
            spreadsheet_id: Some("abc".to_string()),
            token_path: dir.path().join("token.json"),
            ..SheetsConfig::default()
        };
        let store = SheetsStore::connect(config).await;
        assert!(!store.is_available().await);
        assert!(!store.status().await.service_initialized);

        let record = LeadRecord::new()
            .with_contact_info("Ana", Contact::parse("ana@ex.com").unwrap())
            .unwrap();
        assert!(!store.save(&record).await);
        assert_eq!(store.lead_count().await, 0);
        assert!(store.all_leads().await.is_empty());
    }

    fn ok(body: Value) -> (u16, String) {
        (200, body.to_string())
    }

    fn sheet_meta() -> (u16, String) {
        ok(json!({"sheets": [{"properties": {"sheetId": 7, "title": "Leads"}}]}))
    }

    async fn connect_to(server: &CannedServer, dir: &tempfile::TempDir) -> SheetsStore {
        let token_path = dir.path().join("token.json");
        std::fs::write(&token_path, r#"{"token": "ya29.live"}"#).unwrap();
        SheetsStore::connect(SheetsConfig {
            spreadsheet_id: Some("abc".to_string()),
            token_path,
            api_base: server.base_url.clone(),
            timeout: Duration::from_secs(5),
        })
        .await
    }

    fn qualified_lead(contact: &str) -> LeadRecord {
        LeadRecord::new()
            .with_event(true, Some("Congreso".to_string()))
            .unwrap()
            .with_budget(2000.0)
            .unwrap()
            .with_contact_info("Ana", Contact::parse(contact).unwrap())
            .unwrap()
            .with_verdict(true)
            .unwrap()
    }

    #[tokio::test]
    async fn test_connect_writes_and_formats_missing_headers() {
        let server = CannedServer::start(vec![
            sheet_meta(),
            ok(json!({"range": "'Leads'!A1:H1", "majorDimension": "ROWS"})),
            ok(json!({})),
            ok(json!({})),
        ])
        .await;
        let dir = tempfile::tempdir().unwrap();
        let store = connect_to(&server, &dir).await;

        assert!(store.is_available().await);
        let status = store.status().await;
        assert!(status.fully_available);
        assert_eq!(status.error_message, None);

        let requests = server.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].target, "/v4/spreadsheets/abc");
        assert!(requests[1].target.ends_with("A1:H1"));

        assert_eq!(requests[2].method, "PUT");
        assert!(requests[2].target.ends_with("A1:H1?valueInputOption=RAW"));
        assert!(requests[2].body.contains("Es Corporativo"));
        assert!(requests[2].body.contains("Fecha de Registro"));

        assert_eq!(requests[3].method, "POST");
        assert_eq!(requests[3].target, "/v4/spreadsheets/abc:batchUpdate");
        assert!(requests[3].body.contains("repeatCell"));
        assert!(requests[3].body.contains(r#""sheetId":7"#));
    }

    #[tokio::test]
    async fn test_save_appends_at_next_row_and_refuses_duplicates() {
        let header = row::header_row();
        let existing = vec![
            "Sí", "Expo", "$5,000.00", "Luis", "luis@ex.com", "email", "Sí", "2024-05-01 10:00:00",
        ];
        let server = CannedServer::start(vec![
            sheet_meta(),
            ok(json!({"values": [header]})),
            ok(json!({"values": [header, existing]})),
            ok(json!({"updatedRows": 1})),
            ok(json!({"values": [header, existing]})),
        ])
        .await;
        let dir = tempfile::tempdir().unwrap();
        let store = connect_to(&server, &dir).await;

        assert!(store.save(&qualified_lead("ana@ex.com")).await);
        assert!(!store.save(&qualified_lead("LUIS@ex.com")).await);

        let requests = server.requests();
        assert_eq!(requests.len(), 5);
        assert!(requests[2].target.ends_with("A:H"));

        let write = &requests[3];
        assert_eq!(write.method, "PUT");
        assert!(write.target.contains("/v4/spreadsheets/abc/values/"));
        assert!(write.target.ends_with("A3:H3?valueInputOption=RAW"));
        let body: Value = serde_json::from_str(&write.body).unwrap();
        let row = &body["values"][0];
        assert_eq!(row[1], "Congreso");
        assert_eq!(row[2], "$2,000.00");
        assert_eq!(row[4], "ana@ex.com");
        assert_eq!(row[5], "email");

        assert_eq!(requests[4].method, "GET");
    }

    #[tokio::test]
    async fn test_lead_count_and_all_leads_skip_header() {
        let header = row::header_row();
        let stored = vec!["Sí", "Expo", "$5,000.00", "Luis", "luis@ex.com", "email", "Sí", "2024-05-01 10:00:00"];
        let server = CannedServer::start(vec![
            sheet_meta(),
            ok(json!({"values": [header]})),
            ok(json!({"values": [header, stored]})),
            ok(json!({"values": [header, stored]})),
        ])
        .await;
        let dir = tempfile::tempdir().unwrap();
        let store = connect_to(&server, &dir).await;

        assert_eq!(store.lead_count().await, 1);
        let leads = store.all_leads().await;
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].get("Contacto").map(String::as_str), Some("luis@ex.com"));
    }

    #[tokio::test]
    async fn test_api_error_leaves_store_unavailable() {
        let server = CannedServer::start(vec![(403, r#"{"error": "forbidden"}"#.to_string())]).await;
        let dir = tempfile::tempdir().unwrap();
        let store = connect_to(&server, &dir).await;

        assert!(!store.is_available().await);
        let status = store.status().await;
        assert!(status.service_initialized);
        assert!(!status.sheet_name_available);
        assert!(status.error_message.unwrap().contains("403"));
    }
}
