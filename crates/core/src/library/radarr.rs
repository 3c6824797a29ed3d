//! Radarr client.

use async_trait::async_trait;
use serde::Deserialize;

use super::arr::ArrApi;
use super::{LibraryClient, LibraryError, Movie, MovieLibrary};
use crate::config::LibraryConnectionConfig;

/// Radarr v3 API client.
pub struct RadarrClient {
    api: ArrApi,
}

impl RadarrClient {
    pub fn new(config: &LibraryConnectionConfig) -> Result<Self, LibraryError> {
        Ok(Self {
            api: ArrApi::new(config)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RadarrMovie {
    id: u64,
    title: String,
    #[serde(default)]
    year: Option<u32>,
    #[serde(default)]
    has_file: bool,
    #[serde(default)]
    movie_file: Option<RadarrMovieFile>,
}

#[derive(Debug, Deserialize)]
struct RadarrMovieFile {
    #[serde(default)]
    path: Option<String>,
}

impl From<RadarrMovie> for Movie {
    fn from(m: RadarrMovie) -> Self {
        let file_path = m.movie_file.and_then(|f| f.path).filter(|p| !p.is_empty());
        Self {
            id: m.id,
            title: m.title,
            year: m.year.filter(|y| *y != 0),
            has_file: m.has_file && file_path.is_some(),
            file_path,
        }
    }
}

#[async_trait]
impl LibraryClient for RadarrClient {
    fn name(&self) -> &str {
        "Radarr"
    }

    async fn test_connection(&self) -> Result<String, LibraryError> {
        self.api.version().await
    }
}

#[async_trait]
impl MovieLibrary for RadarrClient {
    async fn get_movie(&self, movie_id: u64) -> Result<Movie, LibraryError> {
        let m: RadarrMovie = self
            .api
            .get_json(&format!("movie/{movie_id}"), &[])
            .await?;
        Ok(m.into())
    }
}
