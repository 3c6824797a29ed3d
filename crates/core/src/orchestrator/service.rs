//! Orchestrator implementation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::types::{ProcessingView, SeriesSubmission, SubmitError};
use crate::admin::AdminControl;
use crate::censor::CensorEngine;
use crate::config::Config;
use crate::dispatcher::{Dispatcher, DispatcherConfig, DrainReport};
use crate::history::HistoryStore;
use crate::library::{
    Episode, FilterFlag, FilterKind, FilterStore, FilterStoreError, MovieLibrary, SeriesLibrary,
};
use crate::queue::{EnqueueRejection, EnqueueRequest, MediaItem, QueueItem, QueueManager};
use crate::settings::{
    SettingsError, SettingsHandle, SettingsSnapshot, SettingsStore, SettingsUpdate,
};
use crate::status::{StatusAggregator, SystemStatus};

/// External collaborators the orchestrator is built from.
pub struct OrchestratorDeps {
    pub settings_store: Arc<dyn SettingsStore>,
    pub filters: Arc<dyn FilterStore>,
    pub engine: Arc<dyn CensorEngine>,
    pub sonarr: Option<Arc<dyn SeriesLibrary>>,
    pub radarr: Option<Arc<dyn MovieLibrary>>,
}

/// The processing service.
pub struct Orchestrator {
    settings: SettingsHandle,
    settings_store: Arc<dyn SettingsStore>,
    settings_write: Mutex<()>,
    filters: Arc<dyn FilterStore>,
    sonarr: Option<Arc<dyn SeriesLibrary>>,
    radarr: Option<Arc<dyn MovieLibrary>>,
    queue: Arc<QueueManager>,
    history: Arc<HistoryStore>,
    dispatcher: Arc<Dispatcher>,
    status: StatusAggregator,
    admin: AdminControl,
    drain_timeout: Duration,
}

impl Orchestrator {
    /// Wire up all components. The settings snapshot is loaded from the
    /// store, falling back to defaults when nothing was saved yet.
    pub fn new(config: &Config, deps: OrchestratorDeps) -> Result<Self, SettingsError> {
        let snapshot = match deps.settings_store.load()? {
            Some(snapshot) => snapshot,
            None => {
                info!("No stored settings, using defaults");
                SettingsSnapshot::default()
            }
        };
        let settings = SettingsHandle::new(snapshot);

        let queue = Arc::new(QueueManager::new(
            settings.clone(),
            Arc::clone(&deps.filters),
        ));
        let history = Arc::new(HistoryStore::new(settings.clone()));
        let dispatcher = Arc::new(Dispatcher::new(
            config.dispatcher.clone(),
            Arc::clone(&queue),
            Arc::clone(&history),
            deps.engine,
            settings.clone(),
        ));
        let status = StatusAggregator::new(
            deps.sonarr.clone(),
            deps.radarr.clone(),
            Arc::clone(&queue),
            Arc::clone(&history),
            Duration::from_secs(config.status.probe_timeout_secs),
        );
        let drain_timeout = config.dispatcher.drain_timeout();
        let admin = AdminControl::new(
            config.admin.confirmation_ttl_secs,
            Arc::clone(&queue),
            Arc::clone(&history),
            Arc::clone(&dispatcher),
            settings.clone(),
            Arc::clone(&deps.settings_store),
            drain_timeout,
        );

        Ok(Self {
            settings,
            settings_store: deps.settings_store,
            settings_write: Mutex::new(()),
            filters: deps.filters,
            sonarr: deps.sonarr,
            radarr: deps.radarr,
            queue,
            history,
            dispatcher,
            status,
            admin,
            drain_timeout,
        })
    }

    /// Start background processing.
    pub async fn start(&self) {
        self.queue.set_accepting(true);
        self.dispatcher.start().await;
    }

    /// Close admission and drain in-flight work.
    pub async fn stop(&self) -> DrainReport {
        self.queue.set_accepting(false);
        self.dispatcher.stop(self.drain_timeout).await
    }

    // =========================================================================
    // Processing requests
    // =========================================================================

    fn series_library(&self) -> Result<&Arc<dyn SeriesLibrary>, SubmitError> {
        self.sonarr
            .as_ref()
            .ok_or_else(|| SubmitError::not_configured("Sonarr"))
    }

    fn movie_library(&self) -> Result<&Arc<dyn MovieLibrary>, SubmitError> {
        self.radarr
            .as_ref()
            .ok_or_else(|| SubmitError::not_configured("Radarr"))
    }

    fn ensure_accepting(&self) -> Result<(), SubmitError> {
        if self.queue.is_accepting() {
            Ok(())
        } else {
            Err(EnqueueRejection::ShuttingDown.into())
        }
    }

    fn ensure_filtered(&self, kind: FilterKind, id: u64) -> Result<(), SubmitError> {
        if self.filters.is_filtered(kind, id)? {
            Ok(())
        } else {
            Err(EnqueueRejection::NotEligible { kind, id }.into())
        }
    }

    /// Builds the enqueue request for an episode that has a file.
    async fn episode_request(
        &self,
        sonarr: &Arc<dyn SeriesLibrary>,
        series_title: &str,
        episode: &Episode,
    ) -> Result<EnqueueRequest, SubmitError> {
        let file_id = match episode.episode_file_id {
            Some(id) if episode.has_file => id,
            _ => return Err(SubmitError::NoFile(format!("episode {}", episode.id))),
        };
        let file = sonarr
            .get_episode_file(file_id)
            .await
            .map_err(|e| SubmitError::from_library("Sonarr", e))?;

        Ok(EnqueueRequest {
            media: MediaItem::Episode {
                series_id: episode.series_id,
                episode_id: episode.id,
            },
            title: series_title.to_string(),
            detail: episode.describe(),
            reported_path: file.path,
        })
    }

    /// Queue a single episode.
    pub async fn submit_episode(&self, episode_id: u64) -> Result<QueueItem, SubmitError> {
        self.ensure_accepting()?;
        let sonarr = self.series_library()?;

        let episode = sonarr
            .get_episode(episode_id)
            .await
            .map_err(|e| SubmitError::from_library("Sonarr", e))?;
        self.ensure_filtered(FilterKind::Show, episode.series_id)?;

        let series = sonarr
            .get_series(episode.series_id)
            .await
            .map_err(|e| SubmitError::from_library("Sonarr", e))?;

        let request = self.episode_request(sonarr, &series.title, &episode).await?;
        Ok(self.queue.enqueue(request)?)
    }

    /// Queue every episode of a series that has a file.
    pub async fn submit_series(&self, series_id: u64) -> Result<SeriesSubmission, SubmitError> {
        self.ensure_accepting()?;
        let sonarr = self.series_library()?;

        self.ensure_filtered(FilterKind::Show, series_id)?;

        let series = sonarr
            .get_series(series_id)
            .await
            .map_err(|e| SubmitError::from_library("Sonarr", e))?;
        let episodes = sonarr
            .list_episodes(series_id)
            .await
            .map_err(|e| SubmitError::from_library("Sonarr", e))?;

        let mut submission = SeriesSubmission {
            series_id,
            title: series.title.clone(),
            ..Default::default()
        };

        // Every lookup finishes before the first enqueue.
        let mut requests = Vec::with_capacity(episodes.len());
        for episode in &episodes {
            match self.episode_request(sonarr, &series.title, episode).await {
                Ok(request) => requests.push((episode.id, request)),
                Err(SubmitError::NoFile(_)) => submission.skipped_count += 1,
                Err(e) => return Err(e),
            }
        }

        for (episode_id, request) in requests {
            match self.queue.enqueue(request) {
                Ok(item) => {
                    submission.queued_count += 1;
                    submission.queued_ids.push(item.id);
                }
                Err(EnqueueRejection::ShuttingDown) => {
                    return Err(EnqueueRejection::ShuttingDown.into());
                }
                Err(rejection) => {
                    debug!("Skipping episode {}: {}", episode_id, rejection);
                    submission.skipped_count += 1;
                }
            }
        }

        info!(
            "Series {} ({}): {} queued, {} skipped",
            series_id, series.title, submission.queued_count, submission.skipped_count
        );
        Ok(submission)
    }

    /// Queue a movie.
    pub async fn submit_movie(&self, movie_id: u64) -> Result<QueueItem, SubmitError> {
        self.ensure_accepting()?;
        let radarr = self.movie_library()?;
        self.ensure_filtered(FilterKind::Movie, movie_id)?;

        let movie = radarr
            .get_movie(movie_id)
            .await
            .map_err(|e| SubmitError::from_library("Radarr", e))?;

        let path = match (&movie.file_path, movie.has_file) {
            (Some(path), true) => path.clone(),
            _ => return Err(SubmitError::NoFile(format!("movie {movie_id}"))),
        };

        let request = EnqueueRequest {
            media: MediaItem::Movie { movie_id },
            title: movie.title.clone(),
            detail: movie.describe(),
            reported_path: path,
        };
        Ok(self.queue.enqueue(request)?)
    }

    // =========================================================================
    // Filter flags
    // =========================================================================

    pub fn set_filtered(
        &self,
        kind: FilterKind,
        id: u64,
        filtered: bool,
    ) -> Result<FilterFlag, FilterStoreError> {
        let flag = self.filters.set_filtered(kind, id, filtered)?;
        info!("{} {} filtered = {}", kind, id, filtered);
        Ok(flag)
    }

    pub fn list_filtered(&self, kind: FilterKind) -> Result<Vec<FilterFlag>, FilterStoreError> {
        self.filters.list(kind)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn processing(&self) -> ProcessingView {
        ProcessingView {
            queue: self.queue.snapshot(),
            history: self.history.snapshot(),
            stats: self.history.aggregate(),
        }
    }

    pub async fn status(&self) -> SystemStatus {
        self.status
            .status(self.dispatcher.is_running(), self.admin.is_rebooting())
            .await
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn settings(&self) -> Arc<SettingsSnapshot> {
        self.settings.current()
    }

    /// Merge `update` onto the current snapshot, persist it, then swap it in.
    ///
    /// Nothing changes when validation or persistence fails.
    pub fn update_settings(&self, update: SettingsUpdate) -> Result<SettingsSnapshot, SettingsError> {
        let _write = self
            .settings_write
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let next = update.apply(&self.settings.current())?;
        self.settings_store.save(&next)?;
        self.settings.replace(next.clone());

        let evicted = self.history.enforce_capacity();
        if evicted > 0 {
            warn!("History limit lowered, evicted {} records", evicted);
        }
        info!("Settings updated");
        Ok(next)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn admin(&self) -> &AdminControl {
        &self.admin
    }

    pub fn queue(&self) -> &Arc<QueueManager> {
        &self.queue
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn dispatcher_config(&self) -> &DispatcherConfig {
        self.dispatcher.config()
    }

    pub fn is_running(&self) -> bool {
        self.dispatcher.is_running()
    }
}
