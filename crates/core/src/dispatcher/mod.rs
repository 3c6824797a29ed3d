//! Background job dispatcher.
//!
//! Drives queue items through `Queued -> Processing -> {Succeeded, Failed}`.
//! The terminal states exist only as history records.

mod config;
mod runner;

pub use config::DispatcherConfig;
pub use runner::{Dispatcher, DispatcherStatus, DrainReport, INTERRUPTED_BY_REBOOT};
