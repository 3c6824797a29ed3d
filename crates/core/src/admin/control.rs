//! Admin control surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::confirm::{AdminAction, ConfirmationChallenge, ConfirmationLedger};
use super::AdminError;
use crate::dispatcher::Dispatcher;
use crate::history::HistoryStore;
use crate::queue::QueueManager;
use crate::settings::{SettingsHandle, SettingsStore};

/// What a finished reboot did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebootReport {
    /// In-flight jobs that finished during the drain.
    pub drained: usize,
    /// Queue ids aborted when the drain timed out.
    pub forced: Vec<u64>,
    pub settings_reloaded: bool,
    pub finished_at: DateTime<Utc>,
}

/// Reset and reboot operations, each guarded by a confirmation token.
#[derive(Clone)]
pub struct AdminControl {
    ledger: Arc<ConfirmationLedger>,
    queue: Arc<QueueManager>,
    history: Arc<HistoryStore>,
    dispatcher: Arc<Dispatcher>,
    settings: SettingsHandle,
    settings_store: Arc<dyn SettingsStore>,
    drain_timeout: Duration,
    rebooting: Arc<AtomicBool>,
    last_reboot: Arc<Mutex<Option<RebootReport>>>,
}

impl AdminControl {
    pub fn new(
        confirmation_ttl_secs: u64,
        queue: Arc<QueueManager>,
        history: Arc<HistoryStore>,
        dispatcher: Arc<Dispatcher>,
        settings: SettingsHandle,
        settings_store: Arc<dyn SettingsStore>,
        drain_timeout: Duration,
    ) -> Self {
        Self {
            ledger: Arc::new(ConfirmationLedger::new(confirmation_ttl_secs)),
            queue,
            history,
            dispatcher,
            settings,
            settings_store,
            drain_timeout,
            rebooting: Arc::new(AtomicBool::new(false)),
            last_reboot: Arc::new(Mutex::new(None)),
        }
    }

    /// First phase of any admin action.
    pub fn request_confirmation(&self, action: AdminAction) -> ConfirmationChallenge {
        let challenge = self.ledger.issue(action);
        info!("Issued confirmation for {}", action);
        challenge
    }

    /// Drops every queued item. Items already processing run to completion.
    pub fn reset_queue(&self, token: &str) -> Result<usize, AdminError> {
        self.ledger.consume(AdminAction::ResetQueue, token)?;
        let removed = self.queue.clear_queued();
        info!("Queue reset: {} items removed", removed);
        Ok(removed)
    }

    /// Empties the processing history.
    pub fn reset_history(&self, token: &str) -> Result<usize, AdminError> {
        self.ledger.consume(AdminAction::ResetHistory, token)?;
        let removed = self.history.clear();
        info!("History reset: {} records removed", removed);
        Ok(removed)
    }

    /// Starts a graceful reboot in the background.
    ///
    /// Admission closes, in-flight work drains (forced after the drain
    /// timeout), settings are reloaded from the store, the dispatcher
    /// restarts and admission reopens.
    pub fn reboot(&self, token: &str) -> Result<JoinHandle<RebootReport>, AdminError> {
        if self
            .rebooting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AdminError::RebootInProgress);
        }
        if let Err(e) = self.ledger.consume(AdminAction::Reboot, token) {
            self.rebooting.store(false, Ordering::SeqCst);
            return Err(e);
        }

        info!("Reboot requested");
        self.queue.set_accepting(false);

        let this = self.clone();
        Ok(tokio::spawn(async move { this.run_reboot().await }))
    }

    async fn run_reboot(self) -> RebootReport {
        let drain = self.dispatcher.stop(self.drain_timeout).await;

        let settings_reloaded = match self.settings_store.load() {
            Ok(Some(snapshot)) => {
                self.settings.replace(snapshot.normalized());
                self.history.enforce_capacity();
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Reboot could not reload settings, keeping current: {}", e);
                false
            }
        };

        self.dispatcher.start().await;
        self.queue.set_accepting(true);

        let report = RebootReport {
            drained: drain.completed,
            forced: drain.forced,
            settings_reloaded,
            finished_at: Utc::now(),
        };
        *self
            .last_reboot
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
        self.rebooting.store(false, Ordering::SeqCst);

        info!(
            "Reboot complete ({} drained, {} aborted)",
            report.drained,
            report.forced.len()
        );
        report
    }

    pub fn is_rebooting(&self) -> bool {
        self.rebooting.load(Ordering::SeqCst)
    }

    pub fn last_reboot(&self) -> Option<RebootReport> {
        self.last_reboot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
