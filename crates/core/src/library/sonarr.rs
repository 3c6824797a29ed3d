//! Sonarr client.

use async_trait::async_trait;
use serde::Deserialize;

use super::arr::ArrApi;
use super::{Episode, EpisodeFile, LibraryClient, LibraryError, Series, SeriesLibrary};
use crate::config::LibraryConnectionConfig;

/// Sonarr v3 API client.
pub struct SonarrClient {
    api: ArrApi,
}

impl SonarrClient {
    pub fn new(config: &LibraryConnectionConfig) -> Result<Self, LibraryError> {
        Ok(Self {
            api: ArrApi::new(config)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SonarrSeries {
    id: u64,
    title: String,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SonarrEpisode {
    id: u64,
    series_id: u64,
    season_number: u32,
    episode_number: u32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    has_file: bool,
    #[serde(default)]
    episode_file_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SonarrEpisodeFile {
    id: u64,
    path: String,
}

impl From<SonarrEpisode> for Episode {
    fn from(e: SonarrEpisode) -> Self {
        Self {
            id: e.id,
            series_id: e.series_id,
            season_number: e.season_number,
            episode_number: e.episode_number,
            title: e.title.unwrap_or_default(),
            has_file: e.has_file,
            // Sonarr reports 0 for episodes without a file
            episode_file_id: e.episode_file_id.filter(|id| *id != 0),
        }
    }
}

#[async_trait]
impl LibraryClient for SonarrClient {
    fn name(&self) -> &str {
        "Sonarr"
    }

    async fn test_connection(&self) -> Result<String, LibraryError> {
        self.api.version().await
    }
}

#[async_trait]
impl SeriesLibrary for SonarrClient {
    async fn get_series(&self, series_id: u64) -> Result<Series, LibraryError> {
        let s: SonarrSeries = self
            .api
            .get_json(&format!("series/{series_id}"), &[])
            .await?;
        Ok(Series {
            id: s.id,
            title: s.title,
            path: s.path,
        })
    }

    async fn get_episode(&self, episode_id: u64) -> Result<Episode, LibraryError> {
        let e: SonarrEpisode = self
            .api
            .get_json(&format!("episode/{episode_id}"), &[])
            .await?;
        Ok(e.into())
    }

    async fn list_episodes(&self, series_id: u64) -> Result<Vec<Episode>, LibraryError> {
        let episodes: Vec<SonarrEpisode> = self
            .api
            .get_json("episode", &[("seriesId", series_id.to_string())])
            .await?;
        Ok(episodes.into_iter().map(Episode::from).collect())
    }

    async fn get_episode_file(&self, episode_file_id: u64) -> Result<EpisodeFile, LibraryError> {
        let f: SonarrEpisodeFile = self
            .api
            .get_json(&format!("episodefile/{episode_file_id}"), &[])
            .await?;
        Ok(EpisodeFile {
            id: f.id,
            path: f.path,
        })
    }
}
