//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external collaborator
//! traits (censor engine, Sonarr, Radarr), so the queue, dispatcher and API
//! can be exercised without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use bleeparr_core::testing::{fixtures, MockCensorEngine, MockSeriesLibrary};
//!
//! let engine = MockCensorEngine::new();
//! engine.set_swears_found(4);
//! engine.fail_path("/tv/broken.mkv", "no audio stream");
//!
//! let sonarr = MockSeriesLibrary::new();
//! sonarr.add_series(fixtures::series(1, "The Show"));
//! sonarr.add_episode(fixtures::episode(1, 11, 1, 1, "Pilot"), Some("/tv/s01e01.mkv"));
//! ```

mod mock_censor;
mod mock_library;

pub use mock_censor::MockCensorEngine;
pub use mock_library::{MockMovieLibrary, MockSeriesLibrary};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::library::{Episode, Movie, Series};
    use crate::settings::{PathMapping, SettingsSnapshot};

    /// Create a test series.
    pub fn series(id: u64, title: &str) -> Series {
        Series {
            id,
            title: title.to_string(),
            path: Some(format!("/tv/{title}")),
        }
    }

    /// Create a test episode. The file id is filled in by
    /// [`MockSeriesLibrary::add_episode`](super::MockSeriesLibrary::add_episode).
    pub fn episode(
        series_id: u64,
        id: u64,
        season_number: u32,
        episode_number: u32,
        title: &str,
    ) -> Episode {
        Episode {
            id,
            series_id,
            season_number,
            episode_number,
            title: title.to_string(),
            has_file: false,
            episode_file_id: None,
        }
    }

    /// Create a test movie.
    pub fn movie(id: u64, title: &str, year: u32, file_path: Option<&str>) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            year: Some(year),
            has_file: file_path.is_some(),
            file_path: file_path.map(str::to_string),
        }
    }

    /// Settings with small limits and a `/tv` -> `/media/tv` mapping.
    pub fn settings(max_queue_items: usize, max_history_items: usize) -> SettingsSnapshot {
        SettingsSnapshot {
            max_queue_items,
            max_history_items,
            poll_interval_seconds: 1,
            path_mappings: vec![
                PathMapping::new("/tv", "/media/tv"),
                PathMapping::new("/movies", "/media/movies"),
            ],
            ..Default::default()
        }
    }
}
