//! Settings persistence trait.

use std::sync::{Mutex, PoisonError};

use super::{SettingsError, SettingsSnapshot};

/// Persists the settings snapshot across restarts.
pub trait SettingsStore: Send + Sync {
    /// Load the stored snapshot, if one was ever saved.
    fn load(&self) -> Result<Option<SettingsSnapshot>, SettingsError>;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &SettingsSnapshot) -> Result<(), SettingsError>;
}

/// Non-persistent store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    stored: Mutex<Option<SettingsSnapshot>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: SettingsSnapshot) -> Self {
        Self {
            stored: Mutex::new(Some(snapshot)),
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self) -> Result<Option<SettingsSnapshot>, SettingsError> {
        Ok(self
            .stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, snapshot: &SettingsSnapshot) -> Result<(), SettingsError> {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(())
    }
}
