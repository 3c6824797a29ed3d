//! Shared HTTP plumbing for the Sonarr/Radarr v3 APIs.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::LibraryError;
use crate::config::LibraryConnectionConfig;

/// Minimal `/api/v3` client shared by the Sonarr and Radarr wrappers.
pub(super) struct ArrApi {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SystemStatus {
    #[serde(default)]
    version: Option<String>,
}

impl ArrApi {
    pub(super) fn new(config: &LibraryConnectionConfig) -> Result<Self, LibraryError> {
        if config.url.trim().is_empty() || config.api_key.trim().is_empty() {
            return Err(LibraryError::NotConfigured(
                "URL and API key are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// GET `{base}/api/v3/{path}` and decode the JSON body.
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, LibraryError> {
        let url = format!("{}/api/v3/{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == 401 {
            return Err(LibraryError::NotConfigured("Invalid API key".to_string()));
        }
        if status == 404 {
            return Err(LibraryError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LibraryError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LibraryError::ParseError(format!("{path}: {e}")))
    }

    /// Calls `system/status` and returns the version.
    pub(super) async fn version(&self) -> Result<String, LibraryError> {
        let status: SystemStatus = self.get_json("system/status", &[]).await?;
        Ok(status.version.unwrap_or_else(|| "unknown".to_string()))
    }
}
