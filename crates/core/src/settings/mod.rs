//! Runtime settings.
//!
//! A [`SettingsSnapshot`] is never mutated in place. Updates build a new
//! snapshot, persist it through a [`SettingsStore`], and then swap it into the
//! shared [`SettingsHandle`], so a reader sees either the old or the new
//! configuration and never a mix of both.

mod handle;
mod sqlite_store;
mod store;
mod types;

pub use handle::SettingsHandle;
pub use sqlite_store::SqliteSettingsStore;
pub use store::{InMemorySettingsStore, SettingsStore};
pub use types::{BeepMode, BleeptoolProfile, PathMapping, SettingsSnapshot, SettingsUpdate};

use thiserror::Error;

/// Errors from settings validation and persistence.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Submitted values fail validation.
    #[error("invalid settings: {0}")]
    Invalid(String),

    /// Backing store failed.
    #[error("settings store error: {0}")]
    Store(String),
}
