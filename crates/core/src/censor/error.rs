//! Error types for the censor module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while censoring a file.
///
/// Every variant is absorbed into a failed history record; none of them
/// stops the dispatcher.
#[derive(Debug, Error)]
pub enum CensorError {
    /// Input file not found after path translation.
    #[error("File not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Input extension is not a supported media container.
    #[error("Unsupported input format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Output directory cannot be created or written to.
    #[error("Output directory is not writable: {path}")]
    OutputDirectoryUnwritable { path: PathBuf },

    /// The planned output would replace the source file.
    #[error("Output would overwrite the input file: {path}")]
    OutputOverwritesInput { path: PathBuf },

    /// bleeptool binary not found.
    #[error("Censor tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The tool ran and exited unsuccessfully.
    #[error("Censor tool exited with code {exit_code:?}: {stderr}")]
    ToolFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The tool ran past the configured timeout and was killed.
    #[error("Censoring timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CensorError {
    pub fn tool_failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ToolFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }
}
