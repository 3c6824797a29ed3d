//! Status aggregator.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::types::{OrchestratorState, ServiceStatus, SystemStatus};
use crate::history::HistoryStore;
use crate::library::{LibraryError, MovieLibrary, SeriesLibrary};
use crate::queue::QueueManager;

/// Builds [`SystemStatus`] from live components and connectivity probes.
pub struct StatusAggregator {
    sonarr: Option<Arc<dyn SeriesLibrary>>,
    radarr: Option<Arc<dyn MovieLibrary>>,
    queue: Arc<QueueManager>,
    history: Arc<HistoryStore>,
    probe_timeout: Duration,
}

impl StatusAggregator {
    pub fn new(
        sonarr: Option<Arc<dyn SeriesLibrary>>,
        radarr: Option<Arc<dyn MovieLibrary>>,
        queue: Arc<QueueManager>,
        history: Arc<HistoryStore>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            sonarr,
            radarr,
            queue,
            history,
            probe_timeout,
        }
    }

    /// Probes both libraries concurrently and combines the result with the
    /// queue and history state. `running`/`rebooting` come from the caller.
    pub async fn status(&self, running: bool, rebooting: bool) -> SystemStatus {
        let sonarr = probe(
            "Sonarr",
            self.sonarr.as_ref().map(|c| c.test_connection()),
            self.probe_timeout,
        );
        let radarr = probe(
            "Radarr",
            self.radarr.as_ref().map(|c| c.test_connection()),
            self.probe_timeout,
        );
        let (sonarr, radarr) = futures::join!(sonarr, radarr);

        let counts = self.queue.counts();
        SystemStatus {
            sonarr,
            radarr,
            orchestrator: OrchestratorState {
                running,
                accepting: self.queue.is_accepting(),
                rebooting,
                queued: counts.queued,
                processing: counts.processing,
            },
            stats: self.history.aggregate(),
        }
    }
}

async fn probe<F>(name: &str, check: Option<F>, timeout: Duration) -> ServiceStatus
where
    F: Future<Output = Result<String, LibraryError>>,
{
    let Some(check) = check else {
        return ServiceStatus::not_configured();
    };

    match tokio::time::timeout(timeout, check).await {
        Ok(Ok(version)) => ServiceStatus {
            configured: true,
            connected: true,
            message: format!("Connected to {name} v{version}"),
            version: Some(version),
        },
        Ok(Err(e)) => {
            debug!("{} probe failed: {}", name, e);
            ServiceStatus {
                configured: true,
                connected: false,
                version: None,
                message: format!("Connection failed: {e}"),
            }
        }
        Err(_) => ServiceStatus {
            configured: true,
            connected: false,
            version: None,
            message: format!("Timed out after {}s", timeout.as_secs_f32()),
        },
    }
}
