//! Configuration for the bleeptool engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Static configuration for the bleeptool command-line engine.
///
/// Per-job knobs (profile, boost, buffers) live in the runtime settings
/// snapshot; this only says how to launch the tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BleeptoolConfig {
    /// Path to the bleeptool binary.
    #[serde(default = "default_command")]
    pub command: PathBuf,

    /// Timeout for a single file in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Additional arguments appended before the input flag.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_command() -> PathBuf {
    PathBuf::from("bleeparr")
}

fn default_timeout() -> u64 {
    7200 // 2 hours
}

impl Default for BleeptoolConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            timeout_secs: default_timeout(),
            extra_args: Vec::new(),
        }
    }
}

impl BleeptoolConfig {
    pub fn with_command(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
