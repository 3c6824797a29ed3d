use std::sync::Arc;

use bleeparr_core::{Config, Orchestrator, SanitizedConfig};

use crate::log_buffer::LogBuffer;

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<Orchestrator>,
    logs: LogBuffer,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<Orchestrator>, logs: LogBuffer) -> Self {
        Self {
            config,
            orchestrator,
            logs,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }
}
