use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::censor::BleeptoolConfig;
use crate::dispatcher::DispatcherConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// TV library manager connection
    #[serde(default)]
    pub sonarr: Option<LibraryConnectionConfig>,
    /// Movie library manager connection
    #[serde(default)]
    pub radarr: Option<LibraryConnectionConfig>,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub censor: BleeptoolConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    5050
}

/// Database configuration (settings snapshot and filtered flags)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("bleeparr.db")
}

/// Connection settings for a Sonarr or Radarr instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConnectionConfig {
    /// Base URL (e.g., "http://localhost:8989")
    pub url: String,
    /// API key sent as `X-Api-Key`
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_library_timeout")]
    pub timeout_secs: u32,
}

fn default_library_timeout() -> u32 {
    30
}

impl LibraryConnectionConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            timeout_secs: default_library_timeout(),
        }
    }
}

/// Admin control configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    /// How long a destructive-action confirmation token stays valid.
    #[serde(default = "default_confirmation_ttl")]
    pub confirmation_ttl_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            confirmation_ttl_secs: default_confirmation_ttl(),
        }
    }
}

fn default_confirmation_ttl() -> u64 {
    60
}

/// Log capture configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Number of recent log lines kept for the admin log viewer.
    #[serde(default = "default_buffer_lines")]
    pub buffer_lines: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            buffer_lines: default_buffer_lines(),
        }
    }
}

fn default_buffer_lines() -> usize {
    1000
}

/// Status probe configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    /// Upper bound on a single library connectivity probe.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

fn default_probe_timeout() -> u64 {
    10
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sonarr: Option<SanitizedLibraryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radarr: Option<SanitizedLibraryConfig>,
    pub dispatcher: DispatcherConfig,
}

/// Library connection with the API key hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLibraryConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&LibraryConnectionConfig> for SanitizedLibraryConfig {
    fn from(config: &LibraryConnectionConfig) -> Self {
        Self {
            url: config.url.clone(),
            api_key_configured: !config.api_key.is_empty(),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            sonarr: config.sonarr.as_ref().map(SanitizedLibraryConfig::from),
            radarr: config.radarr.as_ref().map(SanitizedLibraryConfig::from),
            dispatcher: config.dispatcher.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.database.path, PathBuf::from("bleeparr.db"));
        assert!(config.sonarr.is_none());
        assert_eq!(config.admin.confirmation_ttl_secs, 60);
        assert_eq!(config.logging.buffer_lines, 1000);
    }

    #[test]
    fn test_sanitized_hides_api_key() {
        let config = Config {
            sonarr: Some(LibraryConnectionConfig::new("http://sonarr:8989", "secret")),
            ..Default::default()
        };
        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("api_key_configured"));
        assert!(!json.contains("radarr"));
    }
}
