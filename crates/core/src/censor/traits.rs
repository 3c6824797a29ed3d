//! Trait definitions for the censor module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::CensorError;
use crate::settings::SettingsSnapshot;

/// Result of a successful censor run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensorOutcome {
    pub swears_found: u32,
    pub output_path: PathBuf,
}

/// Something that can censor a media file.
#[async_trait]
pub trait CensorEngine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Censors `input` using the given settings.
    ///
    /// `input` is already a local path; library path mapping happens before
    /// this is called.
    async fn process(
        &self,
        input: &Path,
        settings: &SettingsSnapshot,
    ) -> Result<CensorOutcome, CensorError>;

    /// Validates that the engine is properly configured and ready.
    async fn validate(&self) -> Result<(), CensorError>;
}
