use std::{fs, path::Path, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use log::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::{MeliApiError, MeliConfig};

/// Tokens whose expiry lies within this margin are refreshed before use, so a request never goes
/// out with a token that dies mid-flight.
pub const REFRESH_SAFETY_MARGIN: i64 = 120;

/// The persisted access-token record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// True when the token expires within `margin` seconds from now.
    pub fn expires_within(&self, margin: i64) -> bool {
        Utc::now() + Duration::seconds(margin) >= self.expires_at
    }
}

/// The wire shape of the marketplace's `/oauth/token` response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

impl TokenResponse {
    /// The marketplace may omit the refresh token on renewal; keep the one we refreshed with.
    fn into_token(self, previous_refresh_token: &str) -> AccessToken {
        let now = Utc::now();
        let refresh_token = self.refresh_token.unwrap_or_else(|| previous_refresh_token.to_string());
        AccessToken {
            access_token: self.access_token,
            refresh_token,
            created_at: now,
            expires_at: now + Duration::seconds(self.expires_in),
        }
    }
}

/// Single-flight provider for marketplace bearer tokens.
///
/// All callers go through [`TokenProvider::acquire`]. The internal mutex is held for the full
/// check-refresh-persist cycle, so concurrent callers can never issue overlapping refreshes --
/// a stale refresh token would invalidate the newer one the marketplace just handed out.
pub struct TokenProvider {
    config: MeliConfig,
    client: Arc<Client>,
    state: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(config: MeliConfig) -> Result<Self, MeliApiError> {
        let client = Client::builder().build().map_err(|e| MeliApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), state: Mutex::new(None) })
    }

    /// Returns a bearer token that is valid for at least [`REFRESH_SAFETY_MARGIN`] seconds,
    /// refreshing and persisting a new record if the current one is about to lapse.
    pub async fn acquire(&self) -> Result<String, MeliApiError> {
        let mut guard = self.state.lock().await;
        let current = match guard.take() {
            Some(token) => token,
            None => self.load_from_disk()?,
        };
        if !current.expires_within(REFRESH_SAFETY_MARGIN) {
            let value = current.access_token.clone();
            *guard = Some(current);
            return Ok(value);
        }
        debug!("🔑️ Access token expired or close to expiry, requesting a refresh");
        let refreshed = self.refresh(&current.refresh_token).await?;
        self.persist(&refreshed)?;
        let value = refreshed.access_token.clone();
        *guard = Some(refreshed);
        info!("🔑️ Access token refreshed. New expiry: {}", value_expiry(guard.as_ref()));
        Ok(value)
    }

    /// Refreshes the token regardless of its remaining lifetime.
    pub async fn force_refresh(&self) -> Result<String, MeliApiError> {
        let mut guard = self.state.lock().await;
        let current = match guard.take() {
            Some(token) => token,
            None => self.load_from_disk()?,
        };
        let refreshed = self.refresh(&current.refresh_token).await?;
        self.persist(&refreshed)?;
        let value = refreshed.access_token.clone();
        *guard = Some(refreshed);
        Ok(value)
    }

    fn load_from_disk(&self) -> Result<AccessToken, MeliApiError> {
        let raw = fs::read_to_string(&self.config.token_path)
            .map_err(|e| MeliApiError::NoValidToken(format!("token record is missing: {e}")))?;
        serde_json::from_str(&raw).map_err(|e| MeliApiError::NoValidToken(format!("token record is corrupt: {e}")))
    }

    /// Writes the new token record atomically: the record lands in a temp file first and is
    /// renamed over the old one, so a crash mid-write can never leave a half-written record.
    fn persist(&self, token: &AccessToken) -> Result<(), MeliApiError> {
        let dir = self.config.token_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let tmp = NamedTempFile::new_in(dir).map_err(|e| MeliApiError::TokenStore(e.to_string()))?;
        serde_json::to_writer_pretty(&tmp, token).map_err(|e| MeliApiError::TokenStore(e.to_string()))?;
        tmp.persist(&self.config.token_path).map_err(|e| MeliApiError::TokenStore(e.to_string()))?;
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, MeliApiError> {
        let url = format!("{}/oauth/token", self.config.api_base);
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.reveal().as_str()),
            ("refresh_token", refresh_token),
        ];
        let response = self
            .client
            .post(url)
            .form(&params)
            .send()
            .await
            .map_err(|e| MeliApiError::NoValidToken(format!("token refresh failed: {e}")))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(MeliApiError::NoValidToken(format!("token refresh was rejected ({status}): {message}")));
        }
        let parsed = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| MeliApiError::NoValidToken(format!("token refresh response is invalid: {e}")))?;
        Ok(parsed.into_token(refresh_token))
    }
}

fn value_expiry(token: Option<&AccessToken>) -> String {
    token.map(|t| t.expires_at.to_rfc3339()).unwrap_or_else(|| "unknown".to_string())
}
