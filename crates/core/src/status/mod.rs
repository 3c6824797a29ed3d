//! Dashboard status aggregation.

mod aggregator;
mod types;

pub use aggregator::StatusAggregator;
pub use types::{OrchestratorState, ServiceStatus, SystemStatus};
