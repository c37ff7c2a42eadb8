//! OAuth authorized-user token file
//!
//! Reads the token file written by the Google OAuth consent flow, refreshes
//! an expired access token with the stored refresh token, and writes the
//! refreshed token back. The consent flow itself is not run here.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CollaboratorError, CollaboratorResult};

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Treat tokens expiring within this window as already expired
const EXPIRY_SKEW_SECS: i64 = 60;

/// Contents of `token.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUserToken {
    /// Current access token
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    /// Fields we do not interpret (scopes, universe_domain, ...), kept on rewrite
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<i64>,
}

impl AuthorizedUserToken {
    pub fn load(path: &Path) -> CollaboratorResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let token: Self = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "loaded OAuth token");
        Ok(token)
    }

    pub fn save(&self, path: &Path) -> CollaboratorResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Access token present and not about to expire
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.token.is_some() && !self.is_expired_at(now)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= now + ChronoDuration::seconds(EXPIRY_SKEW_SECS),
            None => false,
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }

    pub fn access_token(&self) -> CollaboratorResult<&str> {
        self.token.as_deref().ok_or_else(|| CollaboratorError::Auth {
            message: "token file holds no access token".to_string(),
        })
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh(&mut self, http: &reqwest::Client) -> CollaboratorResult<()> {
        let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
            self.refresh_token.as_deref(),
            self.client_id.as_deref(),
            self.client_secret.as_deref(),
        ) else {
            return Err(CollaboratorError::Auth {
                message: "token cannot be refreshed: refresh_token, client_id or client_secret missing"
                    .to_string(),
            });
        };

        let response = http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Auth {
                message: format!("token refresh failed with {}: {}", status, body.chars().take(200).collect::<String>()),
            });
        }

        let refreshed: RefreshResponse = response.json().await?;
        self.apply_refresh(refreshed.access_token, refreshed.expires_in, Utc::now());
        info!("OAuth access token refreshed");
        Ok(())
    }

    fn apply_refresh(&mut self, access_token: String, expires_in: Option<i64>, now: DateTime<Utc>) {
        self.token = Some(access_token);
        self.expiry = expires_in.map(|secs| now + ChronoDuration::seconds(secs));
    }
}
