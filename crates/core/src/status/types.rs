//! Status types.

use serde::{Deserialize, Serialize};

use crate::history::ProcessingStats;

/// Connectivity of one library manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub configured: bool,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub message: String,
}

impl ServiceStatus {
    pub fn not_configured() -> Self {
        Self {
            configured: false,
            connected: false,
            version: None,
            message: "Not configured".to_string(),
        }
    }
}

/// Runtime state of the processing side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorState {
    /// Dispatcher loop is running.
    pub running: bool,
    /// New work is being admitted.
    pub accepting: bool,
    pub rebooting: bool,
    pub queued: usize,
    pub processing: usize,
}

/// Everything the dashboard polls for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub sonarr: ServiceStatus,
    pub radarr: ServiceStatus,
    pub orchestrator: OrchestratorState,
    pub stats: ProcessingStats,
}
