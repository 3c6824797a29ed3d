//! Types for the orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::{HistoryRecord, ProcessingStats};
use crate::library::{FilterStoreError, LibraryError};
use crate::queue::{EnqueueRejection, QueueItem};

/// Errors from processing requests.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The queue turned the item away.
    #[error(transparent)]
    Rejected(#[from] EnqueueRejection),

    /// The episode or movie has no file on disk.
    #[error("{0} has no file")]
    NoFile(String),

    /// The library manager does not know the id.
    #[error("not found: {0}")]
    NotFound(String),

    /// The library manager is unconfigured or unreachable.
    #[error("{service} unavailable: {message}")]
    LibraryUnavailable { service: String, message: String },

    #[error("filter store error: {0}")]
    FilterStore(#[from] FilterStoreError),
}

impl SubmitError {
    pub(crate) fn from_library(service: &str, err: LibraryError) -> Self {
        match err {
            LibraryError::NotFound(what) => Self::NotFound(what),
            other => Self::LibraryUnavailable {
                service: service.to_string(),
                message: other.to_string(),
            },
        }
    }

    pub(crate) fn not_configured(service: &str) -> Self {
        Self::LibraryUnavailable {
            service: service.to_string(),
            message: "not configured".to_string(),
        }
    }

    /// Stable snake_case code exposed to API clients.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Rejected(rejection) => rejection.reason_code(),
            Self::NoFile(_) => "no_file",
            Self::NotFound(_) => "not_found",
            Self::LibraryUnavailable { .. } => "library_unavailable",
            Self::FilterStore(_) => "internal",
        }
    }
}

/// Result of a series-wide request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSubmission {
    pub series_id: u64,
    pub title: String,
    pub queued_count: usize,
    /// Episodes without a file plus episodes the queue turned away.
    pub skipped_count: usize,
    /// Queue ids of the admitted episodes.
    pub queued_ids: Vec<u64>,
}

/// Everything `/api/processing` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingView {
    pub queue: Vec<QueueItem>,
    pub history: Vec<HistoryRecord>,
    pub stats: ProcessingStats,
}
