//! History record and stats types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::queue::{ItemType, QueueItem};

/// Outcome of one finished job. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Queue id of the job.
    pub id: u64,
    pub item_type: ItemType,
    pub title: String,
    pub detail: String,
    pub source_ref: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub swears_found: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    pub processed_at: DateTime<Utc>,
    /// Wall time in seconds.
    pub duration: f64,
}

impl HistoryRecord {
    pub fn succeeded(
        item: &QueueItem,
        swears_found: u32,
        output_path: impl Into<String>,
        duration: f64,
    ) -> Self {
        Self {
            id: item.id,
            item_type: item.item_type,
            title: item.title.clone(),
            detail: item.detail.clone(),
            source_ref: item.source_ref.clone(),
            success: true,
            error: None,
            swears_found,
            output_path: Some(output_path.into()),
            processed_at: Utc::now(),
            duration,
        }
    }

    pub fn failed(item: &QueueItem, error: impl Into<String>, duration: f64) -> Self {
        Self {
            id: item.id,
            item_type: item.item_type,
            title: item.title.clone(),
            detail: item.detail.clone(),
            source_ref: item.source_ref.clone(),
            success: false,
            error: Some(error.into()),
            swears_found: 0,
            output_path: None,
            processed_at: Utc::now(),
            duration,
        }
    }
}

/// Per item-type totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub show: usize,
    pub movie: usize,
}

/// Dashboard summary of the history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Whole percent, 0 when nothing was processed.
    pub success_rate: u32,
    pub total_processed: usize,
    pub successes: usize,
    pub failures: usize,
    /// Summed over successful jobs only.
    pub total_swears_found: u64,
    pub by_type: TypeBreakdown,
}

impl ProcessingStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a HistoryRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total_processed += 1;
            match record.item_type {
                ItemType::Show => stats.by_type.show += 1,
                ItemType::Movie => stats.by_type.movie += 1,
            }
            if record.success {
                stats.successes += 1;
                stats.total_swears_found += u64::from(record.swears_found);
            } else {
                stats.failures += 1;
            }
        }
        if stats.total_processed > 0 {
            stats.success_rate =
                (stats.successes as f64 * 100.0 / stats.total_processed as f64).round() as u32;
        }
        stats
    }
}
