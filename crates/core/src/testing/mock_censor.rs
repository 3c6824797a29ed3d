//! Mock censor engine for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;

use crate::censor::{plan_output_path, CensorEngine, CensorError, CensorOutcome};
use crate::settings::SettingsSnapshot;

/// Mock implementation of the CensorEngine trait.
///
/// Provides controllable behavior for testing:
/// - Track processed paths for assertions
/// - Fail or panic on specific paths
/// - Simulate slow jobs with a delay
/// - Hold every job until released
#[derive(Debug)]
pub struct MockCensorEngine {
    /// Paths passed to `process`, in call order.
    calls: Arc<RwLock<Vec<PathBuf>>>,
    /// Swear count reported on success.
    swears_found: Arc<RwLock<u32>>,
    /// Simulated processing time.
    delay: Arc<RwLock<Duration>>,
    /// Paths that fail with the given stderr.
    failures: Arc<RwLock<HashMap<PathBuf, String>>>,
    /// Paths that make the engine panic.
    panics: Arc<RwLock<HashSet<PathBuf>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<CensorError>>>,
    /// Jobs wait while this is `false`.
    gate: watch::Sender<bool>,
}

impl Default for MockCensorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCensorEngine {
    /// Create a new mock engine that succeeds immediately.
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            swears_found: Arc::new(RwLock::new(3)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            failures: Arc::new(RwLock::new(HashMap::new())),
            panics: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            gate,
        }
    }

    /// Paths processed so far.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_swears_found(&self, count: u32) {
        *self
            .swears_found
            .write()
            .unwrap_or_else(PoisonError::into_inner) = count;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Make jobs for `path` fail with a tool error carrying `stderr`.
    pub fn fail_path(&self, path: impl AsRef<Path>, stderr: &str) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.as_ref().to_path_buf(), stderr.to_string());
    }

    /// Make jobs for `path` panic inside the engine.
    pub fn panic_on_path(&self, path: impl AsRef<Path>) {
        self.panics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.as_ref().to_path_buf());
    }

    /// Configure the next call to fail with the given error.
    pub fn set_next_error(&self, error: CensorError) {
        *self.next_error.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Hold every job (new and running) until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.gate.send_replace(false);
    }

    pub fn resume(&self) {
        self.gate.send_replace(true);
    }
}

#[async_trait]
impl CensorEngine for MockCensorEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn process(
        &self,
        input: &Path,
        settings: &SettingsSnapshot,
    ) -> Result<CensorOutcome, CensorError> {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(input.to_path_buf());

        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        let delay = *self.delay.read().unwrap_or_else(PoisonError::into_inner);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self
            .panics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(input)
        {
            panic!("mock engine panic for {}", input.display());
        }

        if let Some(error) = self
            .next_error
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(error);
        }

        let failure = self
            .failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(input)
            .cloned();
        if let Some(stderr) = failure {
            return Err(CensorError::tool_failed(Some(1), stderr));
        }

        Ok(CensorOutcome {
            swears_found: *self
                .swears_found
                .read()
                .unwrap_or_else(PoisonError::into_inner),
            output_path: plan_output_path(input, settings),
        })
    }

    async fn validate(&self) -> Result<(), CensorError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_success() {
        let engine = MockCensorEngine::new();
        let outcome = engine
            .process(Path::new("/tv/a.mkv"), &SettingsSnapshot::default())
            .await
            .unwrap();
        assert_eq!(outcome.swears_found, 3);
        assert_eq!(outcome.output_path, PathBuf::from("/tv/clean_a.mkv"));
        assert_eq!(engine.calls(), vec![PathBuf::from("/tv/a.mkv")]);
    }

    #[tokio::test]
    async fn test_next_error_is_one_shot() {
        let engine = MockCensorEngine::new();
        engine.set_next_error(CensorError::Timeout { timeout_secs: 1 });
        let settings = SettingsSnapshot::default();

        assert!(engine.process(Path::new("/a.mkv"), &settings).await.is_err());
        assert!(engine.process(Path::new("/a.mkv"), &settings).await.is_ok());
    }
}
