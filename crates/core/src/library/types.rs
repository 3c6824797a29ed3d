//! Library metadata types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A TV series as reported by Sonarr.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// A single episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u64,
    pub series_id: u64,
    pub season_number: u32,
    pub episode_number: u32,
    pub title: String,
    pub has_file: bool,
    pub episode_file_id: Option<u64>,
}

impl Episode {
    /// "S01E02 - Title", the detail line shown next to the series title.
    pub fn describe(&self) -> String {
        format!(
            "S{:02}E{:02} - {}",
            self.season_number, self.episode_number, self.title
        )
    }
}

/// The file backing an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeFile {
    pub id: u64,
    pub path: String,
}

/// A movie as reported by Radarr.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub year: Option<u32>,
    pub has_file: bool,
    /// Path of the movie file, when it has one.
    pub file_path: Option<String>,
}

impl Movie {
    pub fn describe(&self) -> String {
        match self.year {
            Some(year) => format!("({year})"),
            None => String::new(),
        }
    }
}

/// Kind of title a `filtered` flag is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Show,
    Movie,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Movie => "movie",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "show" => Some(Self::Show),
            "movie" => Some(Self::Movie),
            _ => None,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether processing requests for a show or movie are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFlag {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: FilterKind,
    pub filtered: bool,
}
