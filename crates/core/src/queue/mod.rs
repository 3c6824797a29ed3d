//! Processing queue.
//!
//! The [`QueueManager`] is the single source of truth for what is waiting or
//! being worked on. Every mutation goes through one lock, and nothing inside
//! that lock performs I/O.

mod manager;
mod types;

pub use manager::QueueManager;
pub use types::{
    EnqueueRejection, EnqueueRequest, ItemType, MediaItem, QueueCounts, QueueItem, QueueState,
};
