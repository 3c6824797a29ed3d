//! Queue data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::library::FilterKind;

/// What a job censors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaItem {
    Episode { series_id: u64, episode_id: u64 },
    Movie { movie_id: u64 },
}

impl MediaItem {
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Episode { .. } => ItemType::Show,
            Self::Movie { .. } => ItemType::Movie,
        }
    }

    /// Stable identity of the source file; at most one live job per value.
    pub fn source_ref(&self) -> String {
        match self {
            Self::Episode { episode_id, .. } => format!("episode:{episode_id}"),
            Self::Movie { movie_id } => format!("movie:{movie_id}"),
        }
    }

    /// The show or movie whose `filtered` flag gates this item.
    pub fn eligibility_key(&self) -> (FilterKind, u64) {
        match self {
            Self::Episode { series_id, .. } => (FilterKind::Show, *series_id),
            Self::Movie { movie_id } => (FilterKind::Movie, *movie_id),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Episode {
                series_id,
                episode_id,
            } => format!("episode {episode_id} of series {series_id}"),
            Self::Movie { movie_id } => format!("movie {movie_id}"),
        }
    }
}

/// Wire-level item type. Episodes are reported as `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Show,
    Movie,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Movie => "movie",
        }
    }
}

/// Lifecycle of a live queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueState {
    Queued,
    Processing,
}

/// A job waiting for, or undergoing, censoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: u64,
    pub item_type: ItemType,
    pub media: MediaItem,
    /// Series or movie title.
    pub title: String,
    /// Episode line ("S01E02 - Name") or movie year.
    pub detail: String,
    pub source_ref: String,
    /// Path as reported by the library manager.
    pub reported_path: String,
    /// Local path computed with the mappings in effect at enqueue time.
    pub resolved_path: String,
    #[serde(rename = "created_at")]
    pub enqueued_at: DateTime<Utc>,
    pub state: QueueState,
}

/// Input to [`QueueManager::enqueue`](super::QueueManager::enqueue).
#[derive(Debug, Clone)]
pub struct EnqueueRequest {
    pub media: MediaItem,
    pub title: String,
    pub detail: String,
    pub reported_path: String,
}

/// Live queue counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub queued: usize,
    pub processing: usize,
}

/// Why an enqueue was turned away. The queue is untouched in every case.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnqueueRejection {
    #[error("not accepting new work while a reboot is in progress")]
    ShuttingDown,

    #[error("{kind} {id} is not marked for filtering")]
    NotEligible { kind: FilterKind, id: u64 },

    #[error("{source_ref} is already queued or processing")]
    Duplicate { source_ref: String },

    #[error("queue is full ({capacity} items)")]
    QueueFull { capacity: usize },

    #[error("could not check eligibility: {0}")]
    EligibilityUnavailable(String),
}

impl EnqueueRejection {
    /// Stable snake_case code exposed to API clients.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::ShuttingDown => "shutting_down",
            Self::NotEligible { .. } => "not_eligible",
            Self::Duplicate { .. } => "duplicate",
            Self::QueueFull { .. } => "queue_full",
            Self::EligibilityUnavailable(_) => "internal",
        }
    }
}
