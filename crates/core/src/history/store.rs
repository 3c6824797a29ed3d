//! In-memory history ledger.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use tracing::info;

use super::types::{HistoryRecord, ProcessingStats};
use crate::settings::SettingsHandle;

/// Append-only, bounded ledger of finished jobs.
///
/// Capacity comes from the current settings snapshot, so lowering
/// `max_history_items` takes effect on the next append or on
/// [`enforce_capacity`](Self::enforce_capacity).
pub struct HistoryStore {
    records: RwLock<VecDeque<HistoryRecord>>,
    settings: SettingsHandle,
}

impl HistoryStore {
    pub fn new(settings: SettingsHandle) -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
            settings,
        }
    }

    pub fn append(&self, record: HistoryRecord) {
        let capacity = self.settings.current().max_history_items;
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.push_back(record);
        while records.len() > capacity {
            records.pop_front();
        }
    }

    /// Newest first.
    pub fn snapshot(&self) -> Vec<HistoryRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every record. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let removed = records.len();
        records.clear();
        info!("Cleared {} history records", removed);
        removed
    }

    /// Evicts the oldest records beyond the current capacity.
    pub fn enforce_capacity(&self) -> usize {
        let capacity = self.settings.current().max_history_items;
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let excess = records.len().saturating_sub(capacity);
        records.drain(..excess);
        excess
    }

    pub fn aggregate(&self) -> ProcessingStats {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        ProcessingStats::from_records(records.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{ItemType, MediaItem, QueueItem, QueueState};
    use crate::settings::SettingsSnapshot;
    use chrono::Utc;

    fn item(id: u64, media: MediaItem) -> QueueItem {
        QueueItem {
            id,
            item_type: media.item_type(),
            media,
            title: format!("Title {id}"),
            detail: String::new(),
            source_ref: media.source_ref(),
            reported_path: String::new(),
            resolved_path: String::new(),
            enqueued_at: Utc::now(),
            state: QueueState::Processing,
        }
    }

    fn movie(id: u64) -> QueueItem {
        item(id, MediaItem::Movie { movie_id: id })
    }

    fn store(max_history_items: usize) -> (HistoryStore, SettingsHandle) {
        let settings = SettingsHandle::new(SettingsSnapshot {
            max_history_items,
            ..Default::default()
        });
        (HistoryStore::new(settings.clone()), settings)
    }

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let (history, _) = store(3);
        for id in 1..=5 {
            history.append(HistoryRecord::succeeded(&movie(id), 0, "/out", 1.0));
        }
        let ids: Vec<u64> = history.snapshot().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn test_enforce_capacity_after_limit_lowered() {
        let (history, settings) = store(10);
        for id in 1..=6 {
            history.append(HistoryRecord::failed(&movie(id), "boom", 0.5));
        }
        settings.replace(SettingsSnapshot {
            max_history_items: 2,
            ..Default::default()
        });

        assert_eq!(history.enforce_capacity(), 4);
        let ids: Vec<u64> = history.snapshot().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![6, 5]);
    }

    #[test]
    fn test_aggregate() {
        let (history, _) = store(100);
        assert_eq!(history.aggregate().success_rate, 0);

        let episode = item(
            1,
            MediaItem::Episode {
                series_id: 2,
                episode_id: 1,
            },
        );
        history.append(HistoryRecord::succeeded(&episode, 4, "/out/a", 1.0));
        history.append(HistoryRecord::succeeded(&movie(2), 6, "/out/b", 1.0));
        history.append(HistoryRecord::failed(&movie(3), "missing", 0.1));

        let stats = history.aggregate();
        assert_eq!(stats.total_processed, 3);
        assert_eq!(stats.successes, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.success_rate, 67);
        assert_eq!(stats.total_swears_found, 10);
        assert_eq!(stats.by_type.show, 1);
        assert_eq!(stats.by_type.movie, 2);
    }

    #[test]
    fn test_clear() {
        let (history, _) = store(100);
        history.append(HistoryRecord::failed(&movie(1), "x", 0.0));
        assert_eq!(history.clear(), 1);
        assert!(history.is_empty());
        assert_eq!(history.aggregate().total_processed, 0);
    }

    #[test]
    fn test_record_wire_shape() {
        let record = HistoryRecord::failed(&movie(4), "File not found", 0.25);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["item_type"], "movie");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "File not found");
        assert_eq!(json["duration"], 0.25);
        assert!(json.get("output_path").is_none());
        assert_eq!(record.item_type, ItemType::Movie);
    }
}
