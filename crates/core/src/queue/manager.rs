//! Queue manager.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::Notify;
use tracing::{debug, info};

use super::types::{
    EnqueueRejection, EnqueueRequest, QueueCounts, QueueItem, QueueState,
};
use crate::library::FilterStore;
use crate::metrics;
use crate::settings::SettingsHandle;

struct QueueInner {
    next_id: u64,
    items: VecDeque<QueueItem>,
}

/// Bounded FIFO of pending and in-flight jobs.
pub struct QueueManager {
    inner: Mutex<QueueInner>,
    notify: Arc<Notify>,
    accepting: AtomicBool,
    settings: SettingsHandle,
    filters: Arc<dyn FilterStore>,
}

impl QueueManager {
    pub fn new(settings: SettingsHandle, filters: Arc<dyn FilterStore>) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                next_id: 1,
                items: VecDeque::new(),
            }),
            notify: Arc::new(Notify::new()),
            accepting: AtomicBool::new(true),
            settings,
            filters,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a job.
    ///
    /// Checks run in order: accepting, eligibility, duplicate, capacity.
    pub fn enqueue(&self, request: EnqueueRequest) -> Result<QueueItem, EnqueueRejection> {
        let result = self.try_enqueue(request);
        match &result {
            Ok(item) => {
                metrics::JOBS_ENQUEUED
                    .with_label_values(&[item.item_type.as_str()])
                    .inc();
                self.notify.notify_one();
            }
            Err(rejection) => {
                metrics::ENQUEUE_REJECTED
                    .with_label_values(&[rejection.reason_code()])
                    .inc();
            }
        }
        result
    }

    fn try_enqueue(&self, request: EnqueueRequest) -> Result<QueueItem, EnqueueRejection> {
        if !self.is_accepting() {
            return Err(EnqueueRejection::ShuttingDown);
        }

        let (kind, id) = request.media.eligibility_key();
        let eligible = self
            .filters
            .is_filtered(kind, id)
            .map_err(|e| EnqueueRejection::EligibilityUnavailable(e.to_string()))?;
        if !eligible {
            return Err(EnqueueRejection::NotEligible { kind, id });
        }

        let settings = self.settings.current();
        let resolved_path = settings.path_resolver().translate(&request.reported_path);
        let source_ref = request.media.source_ref();

        let mut inner = self.lock();

        // Re-checked under the lock so nothing slips in after a reboot stops admission.
        if !self.is_accepting() {
            return Err(EnqueueRejection::ShuttingDown);
        }
        if inner.items.iter().any(|i| i.source_ref == source_ref) {
            return Err(EnqueueRejection::Duplicate { source_ref });
        }
        if inner.items.len() >= settings.max_queue_items {
            return Err(EnqueueRejection::QueueFull {
                capacity: settings.max_queue_items,
            });
        }

        let item = QueueItem {
            id: inner.next_id,
            item_type: request.media.item_type(),
            media: request.media,
            title: request.title,
            detail: request.detail,
            source_ref,
            reported_path: request.reported_path,
            resolved_path,
            enqueued_at: Utc::now(),
            state: QueueState::Queued,
        };
        inner.next_id += 1;
        inner.items.push_back(item.clone());
        metrics::QUEUE_DEPTH.set(inner.items.len() as i64);

        info!("Queued {} ({}) as job {}", item.source_ref, item.title, item.id);
        Ok(item)
    }

    /// Marks the oldest queued item as processing and returns a copy of it.
    pub fn dequeue_next(&self) -> Option<QueueItem> {
        let mut inner = self.lock();
        let item = inner
            .items
            .iter_mut()
            .find(|i| i.state == QueueState::Queued)?;
        item.state = QueueState::Processing;
        debug!("Dequeued job {}", item.id);
        Some(item.clone())
    }

    /// Removes a finished item. Only processing items can complete.
    pub fn complete(&self, id: u64) -> Option<QueueItem> {
        let mut inner = self.lock();
        let pos = inner
            .items
            .iter()
            .position(|i| i.id == id && i.state == QueueState::Processing)?;
        let item = inner.items.remove(pos);
        metrics::QUEUE_DEPTH.set(inner.items.len() as i64);
        item
    }

    /// Drops every queued item; processing items stay. Returns how many were removed.
    pub fn clear_queued(&self) -> usize {
        let mut inner = self.lock();
        let before = inner.items.len();
        inner.items.retain(|i| i.state == QueueState::Processing);
        let removed = before - inner.items.len();
        metrics::QUEUE_DEPTH.set(inner.items.len() as i64);
        if removed > 0 {
            info!("Cleared {} queued items", removed);
        }
        removed
    }

    /// Point-in-time copy of the queue in FIFO order.
    pub fn snapshot(&self) -> Vec<QueueItem> {
        self.lock().items.iter().cloned().collect()
    }

    pub fn counts(&self) -> QueueCounts {
        let inner = self.lock();
        let processing = inner
            .items
            .iter()
            .filter(|i| i.state == QueueState::Processing)
            .count();
        QueueCounts {
            queued: inner.items.len() - processing,
            processing,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Opens or closes admission.
    pub fn set_accepting(&self, accepting: bool) {
        // Taken so a concurrent enqueue is either fully in or fully out.
        let _guard = self.lock();
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    /// Signalled whenever an item is admitted.
    pub fn notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.notify)
    }
}
