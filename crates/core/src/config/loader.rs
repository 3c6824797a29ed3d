use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{
    types::{Config, LibraryConnectionConfig},
    ConfigError,
};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let mut config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("BLEEPARR_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    apply_legacy_env(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Fill missing library sections from the `SONARR_URL`/`SONARR_API_KEY` and
/// `RADARR_URL`/`RADARR_API_KEY` variables older deployments set.
pub fn apply_legacy_env<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let from_env = |prefix: &str| -> Option<LibraryConnectionConfig> {
        let url = lookup(&format!("{prefix}_URL")).filter(|v| !v.is_empty())?;
        let api_key = lookup(&format!("{prefix}_API_KEY")).filter(|v| !v.is_empty())?;
        Some(LibraryConnectionConfig::new(url, api_key))
    };

    if config.sonarr.is_none() {
        config.sonarr = from_env("SONARR");
    }
    if config.radarr.is_none() {
        config.radarr = from_env("RADARR");
    }
}
