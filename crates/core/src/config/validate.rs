use super::{types::Config, ConfigError, LibraryConnectionConfig};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Dispatcher has at least one worker slot
/// - Library sections carry a usable URL and API key
/// - Censor command is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.dispatcher.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "dispatcher.concurrency must be at least 1".to_string(),
        ));
    }

    if let Some(ref sonarr) = config.sonarr {
        validate_library("sonarr", sonarr)?;
    }
    if let Some(ref radarr) = config.radarr {
        validate_library("radarr", radarr)?;
    }

    if config.censor.command.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "censor.command cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_library(section: &str, library: &LibraryConnectionConfig) -> Result<(), ConfigError> {
    if !(library.url.starts_with("http://") || library.url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "{section}.url must be an http(s) URL, got '{}'",
            library.url
        )));
    }
    if library.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{section}.api_key cannot be empty"
        )));
    }
    Ok(())
}
