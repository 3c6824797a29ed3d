//! Mock Sonarr and Radarr clients for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::library::{
    Episode, EpisodeFile, LibraryClient, LibraryError, Movie, MovieLibrary, Series, SeriesLibrary,
};

/// Connectivity knobs shared by both mocks.
#[derive(Debug)]
struct Connectivity {
    version: String,
    connection_error: RwLock<Option<String>>,
    connection_delay: RwLock<Duration>,
    unavailable: AtomicBool,
}

impl Connectivity {
    fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            connection_error: RwLock::new(None),
            connection_delay: RwLock::new(Duration::ZERO),
            unavailable: AtomicBool::new(false),
        }
    }

    fn check(&self) -> Result<(), LibraryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LibraryError::ApiError {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    async fn test_connection(&self) -> Result<String, LibraryError> {
        let delay = *self
            .connection_delay
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        let error = self
            .connection_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match error {
            Some(message) => Err(LibraryError::ApiError {
                status: 503,
                message,
            }),
            None => Ok(self.version.clone()),
        }
    }
}

/// Mock implementation of the SeriesLibrary trait.
#[derive(Debug)]
pub struct MockSeriesLibrary {
    series: Arc<RwLock<HashMap<u64, Series>>>,
    episodes: Arc<RwLock<HashMap<u64, Episode>>>,
    files: Arc<RwLock<HashMap<u64, EpisodeFile>>>,
    connectivity: Connectivity,
    episode_list_calls: AtomicUsize,
}

impl Default for MockSeriesLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSeriesLibrary {
    /// Create an empty library reporting version 4.0.0.
    pub fn new() -> Self {
        Self {
            series: Arc::new(RwLock::new(HashMap::new())),
            episodes: Arc::new(RwLock::new(HashMap::new())),
            files: Arc::new(RwLock::new(HashMap::new())),
            connectivity: Connectivity::new("4.0.0"),
            episode_list_calls: AtomicUsize::new(0),
        }
    }

    pub fn add_series(&self, series: Series) {
        self.series
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(series.id, series);
    }

    /// Add an episode. With a path, an episode file is created for it and
    /// the episode is marked as having a file.
    pub fn add_episode(&self, mut episode: Episode, path: Option<&str>) {
        if let Some(path) = path {
            let file_id = episode.id + 10_000;
            episode.has_file = true;
            episode.episode_file_id = Some(file_id);
            self.files
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(
                    file_id,
                    EpisodeFile {
                        id: file_id,
                        path: path.to_string(),
                    },
                );
        }
        self.episodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(episode.id, episode);
    }

    /// Make `test_connection` fail with `message`.
    pub fn set_connection_error(&self, message: &str) {
        *self
            .connectivity
            .connection_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
    }

    pub fn set_connection_delay(&self, delay: Duration) {
        *self
            .connectivity
            .connection_delay
            .write()
            .unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Make every call fail as if the service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.connectivity
            .unavailable
            .store(unavailable, Ordering::SeqCst);
    }

    /// Number of `list_episodes` calls made.
    pub fn episode_list_calls(&self) -> usize {
        self.episode_list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LibraryClient for MockSeriesLibrary {
    fn name(&self) -> &str {
        "Sonarr"
    }

    async fn test_connection(&self) -> Result<String, LibraryError> {
        self.connectivity.test_connection().await
    }
}

#[async_trait]
impl SeriesLibrary for MockSeriesLibrary {
    async fn get_series(&self, series_id: u64) -> Result<Series, LibraryError> {
        self.connectivity.check()?;
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&series_id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(format!("series/{series_id}")))
    }

    async fn get_episode(&self, episode_id: u64) -> Result<Episode, LibraryError> {
        self.connectivity.check()?;
        self.episodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&episode_id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(format!("episode/{episode_id}")))
    }

    async fn list_episodes(&self, series_id: u64) -> Result<Vec<Episode>, LibraryError> {
        self.episode_list_calls.fetch_add(1, Ordering::SeqCst);
        self.connectivity.check()?;
        let mut episodes: Vec<Episode> = self
            .episodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|e| e.series_id == series_id)
            .cloned()
            .collect();
        episodes.sort_by_key(|e| (e.season_number, e.episode_number));
        Ok(episodes)
    }

    async fn get_episode_file(&self, episode_file_id: u64) -> Result<EpisodeFile, LibraryError> {
        self.connectivity.check()?;
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&episode_file_id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(format!("episodefile/{episode_file_id}")))
    }
}

/// Mock implementation of the MovieLibrary trait.
#[derive(Debug)]
pub struct MockMovieLibrary {
    movies: Arc<RwLock<HashMap<u64, Movie>>>,
    connectivity: Connectivity,
}

impl Default for MockMovieLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMovieLibrary {
    /// Create an empty library reporting version 5.0.0.
    pub fn new() -> Self {
        Self {
            movies: Arc::new(RwLock::new(HashMap::new())),
            connectivity: Connectivity::new("5.0.0"),
        }
    }

    pub fn add_movie(&self, movie: Movie) {
        self.movies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(movie.id, movie);
    }

    /// Make `test_connection` fail with `message`.
    pub fn set_connection_error(&self, message: &str) {
        *self
            .connectivity
            .connection_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
    }

    pub fn set_connection_delay(&self, delay: Duration) {
        *self
            .connectivity
            .connection_delay
            .write()
            .unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Make every call fail as if the service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.connectivity
            .unavailable
            .store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl LibraryClient for MockMovieLibrary {
    fn name(&self) -> &str {
        "Radarr"
    }

    async fn test_connection(&self) -> Result<String, LibraryError> {
        self.connectivity.test_connection().await
    }
}

#[async_trait]
impl MovieLibrary for MockMovieLibrary {
    async fn get_movie(&self, movie_id: u64) -> Result<Movie, LibraryError> {
        self.connectivity.check()?;
        self.movies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(format!("movie/{movie_id}")))
    }
}
