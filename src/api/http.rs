//! HTTP implementation of the settings service contract
//!
//! | Operation     | Request                          | Failure                      |
//! |---------------|----------------------------------|------------------------------|
//! | List personas | `GET {personas_path}`            | non-2xx                      |
//! | Get settings  | `GET {settings_path}`            | non-2xx                      |
//! | Save settings | `POST {settings_path}` full JSON | non-2xx, `{"message": ...}`  |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::types::{Persona, Settings};

use super::SettingsApi;

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

/// Connection settings for the HTTP settings service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpApiConfig {
    /// Service base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Path of the personas collection
    pub personas_path: String,

    /// Path of the settings singleton
    pub settings_path: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            personas_path: "/api/personas".to_string(),
            settings_path: "/api/settings".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Body of a rejected save
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ─────────────────────────────────────────────────────────────────
// HTTP Client
// ─────────────────────────────────────────────────────────────────

/// Settings service reached over HTTP with JSON bodies
pub struct HttpSettingsApi {
    config: HttpApiConfig,
    client: Client,
    personas_url: String,
    settings_url: String,
}

impl HttpSettingsApi {
    /// Create a client for the configured service
    pub fn new(config: HttpApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let personas_url = endpoint(&config.base_url, &config.personas_path)?;
        let settings_url = endpoint(&config.base_url, &config.settings_path)?;

        info!(
            personas_url = %personas_url,
            settings_url = %settings_url,
            timeout_secs = config.timeout_secs,
            "Settings service client created"
        );

        Ok(Self {
            config,
            client,
            personas_url,
            settings_url,
        })
    }

    /// Map a reqwest failure that happened before any response arrived
    fn transport_error(&self, url: &str, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::ConnectionTimeout {
                url: url.to_string(),
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            Error::connection_failed(url, e.to_string())
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Settings service returned an error");
            return Err(Error::ApiStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| Error::ApiMalformed {
            message: format!("{}: {}", url, e),
        })
    }
}

/// Join the base URL and an absolute endpoint path, keeping any base prefix
fn endpoint(base_url: &str, path: &str) -> Result<String> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined)
        .map(|u| u.to_string())
        .map_err(|e| Error::config_field_invalid("api.base_url", format!("'{}': {}", joined, e)))
}

#[async_trait]
impl SettingsApi for HttpSettingsApi {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn list_personas(&self) -> Result<Vec<Persona>> {
        let personas: Vec<Persona> = self.get_json(&self.personas_url).await?;
        debug!(count = personas.len(), "Personas fetched");
        Ok(personas)
    }

    async fn get_settings(&self) -> Result<Settings> {
        let settings: Settings = self.get_json(&self.settings_url).await?;
        debug!(id = %settings.id, "Settings fetched");
        Ok(settings)
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let url = &self.settings_url;
        debug!(url = %url, id = %settings.id, "POST");

        let response = self
            .client
            .post(url)
            .json(settings)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| format!("settings service returned {}", status));

        Err(Error::save_failed(Some(status.as_u16()), message))
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
