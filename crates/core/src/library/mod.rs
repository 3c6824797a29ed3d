//! Sonarr/Radarr integration and the per-title `filtered` flags.
//!
//! The library managers are the source of truth for titles and file paths.
//! Bleeparr only reads from them; whether a show or movie may be censored is
//! tracked locally in a [`FilterStore`].

mod arr;
mod filter_store;
mod radarr;
mod sonarr;
mod types;

pub use filter_store::{FilterStore, FilterStoreError, InMemoryFilterStore, SqliteFilterStore};
pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to a library manager.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// HTTP request failed (connection refused, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing URL or API key).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Common surface of every library manager client.
#[async_trait]
pub trait LibraryClient: Send + Sync {
    /// Display name ("Sonarr", "Radarr").
    fn name(&self) -> &str;

    /// Checks connectivity and returns the remote version string.
    async fn test_connection(&self) -> Result<String, LibraryError>;
}

/// TV library (Sonarr).
#[async_trait]
pub trait SeriesLibrary: LibraryClient {
    async fn get_series(&self, series_id: u64) -> Result<Series, LibraryError>;

    async fn get_episode(&self, episode_id: u64) -> Result<Episode, LibraryError>;

    async fn list_episodes(&self, series_id: u64) -> Result<Vec<Episode>, LibraryError>;

    async fn get_episode_file(&self, episode_file_id: u64) -> Result<EpisodeFile, LibraryError>;
}

/// Movie library (Radarr).
#[async_trait]
pub trait MovieLibrary: LibraryClient {
    async fn get_movie(&self, movie_id: u64) -> Result<Movie, LibraryError>;
}
