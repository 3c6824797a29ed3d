//! Bounded processing history and the aggregate stats derived from it.

mod store;
mod types;

pub use store::HistoryStore;
pub use types::{HistoryRecord, ProcessingStats, TypeBreakdown};
