use std::sync::{Arc, PoisonError, RwLock};

use super::SettingsSnapshot;

/// Shared pointer to the current settings snapshot.
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    current: Arc<RwLock<Arc<SettingsSnapshot>>>,
}

impl Default for SettingsHandle {
    fn default() -> Self {
        Self::new(SettingsSnapshot::default())
    }
}

impl SettingsHandle {
    pub fn new(snapshot: SettingsSnapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// The snapshot in effect right now.
    pub fn current(&self) -> Arc<SettingsSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Installs `snapshot` and returns the one it replaced.
    pub fn replace(&self, snapshot: SettingsSnapshot) -> Arc<SettingsSnapshot> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(snapshot))
    }
}
