//! Dispatcher configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the job dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Maximum jobs running at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// How long a reboot waits for in-flight jobs before aborting them.
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_secs: u64,
}

fn default_concurrency() -> usize {
    1
}

fn default_drain_timeout() -> u64 {
    300 // 5 minutes
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            drain_timeout_secs: default_drain_timeout(),
        }
    }
}

impl DispatcherConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}
