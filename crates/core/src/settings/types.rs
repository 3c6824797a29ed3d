//! Settings snapshot types.

use serde::{Deserialize, Serialize};

use super::SettingsError;
use crate::path_resolver::PathResolver;

/// Detection passes the censor pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BleeptoolProfile {
    #[serde(rename = "S")]
    Subtitles,
    #[serde(rename = "S-M")]
    SubtitlesMusic,
    #[serde(rename = "S-FSM")]
    SubtitlesFullScanMusic,
    #[default]
    #[serde(rename = "S-M-FSM")]
    SubtitlesMusicFullScanMusic,
}

impl BleeptoolProfile {
    /// The profile string passed on the bleeptool command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subtitles => "S",
            Self::SubtitlesMusic => "S-M",
            Self::SubtitlesFullScanMusic => "S-FSM",
            Self::SubtitlesMusicFullScanMusic => "S-M-FSM",
        }
    }
}

/// What gets replaced by a beep when `use_beep` is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeepMode {
    #[default]
    Words,
    Segments,
    Both,
}

impl BeepMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Words => "words",
            Self::Segments => "segments",
            Self::Both => "both",
        }
    }
}

/// A prefix rewrite from a library-reported path to a local path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathMapping {
    #[serde(default)]
    pub host_path: String,
    #[serde(default)]
    pub container_path: String,
}

impl PathMapping {
    pub fn new(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.host_path.trim().is_empty() && !self.container_path.trim().is_empty()
    }
}

/// Immutable runtime settings.
///
/// Replaced wholesale through [`super::SettingsHandle`]; readers hold an
/// `Arc` to the snapshot they started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSnapshot {
    pub swears_file: String,
    pub output_prefix: String,
    pub output_directory: String,
    #[serde(rename = "bleeptool")]
    pub bleeptool_profile: BleeptoolProfile,
    pub boost_db: i32,
    #[serde(rename = "pre_buffer")]
    pub pre_buffer_ms: u32,
    #[serde(rename = "post_buffer")]
    pub post_buffer_ms: u32,
    pub use_beep: bool,
    pub beep_mode: BeepMode,
    pub retain_clips: bool,
    pub temp_dir: String,
    #[serde(with = "mappings_json")]
    pub path_mappings: Vec<PathMapping>,
    #[serde(alias = "maxQueueItems")]
    pub max_queue_items: usize,
    #[serde(alias = "maxHistoryItems")]
    pub max_history_items: usize,
    pub poll_interval_seconds: u64,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            swears_file: "swears.txt".to_string(),
            output_prefix: "clean_".to_string(),
            output_directory: String::new(),
            bleeptool_profile: BleeptoolProfile::default(),
            boost_db: 6,
            pre_buffer_ms: 100,
            post_buffer_ms: 100,
            use_beep: false,
            beep_mode: BeepMode::default(),
            retain_clips: false,
            temp_dir: String::new(),
            path_mappings: Vec::new(),
            max_queue_items: 50,
            max_history_items: 100,
            poll_interval_seconds: 300,
        }
    }
}

/// Upper bound for the pre/post mute buffers.
const MAX_BUFFER_MS: u32 = 10_000;

impl SettingsSnapshot {
    /// Path resolver over this snapshot's mappings.
    pub fn path_resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.path_mappings)
    }

    /// Drops mapping entries with a blank side.
    pub fn normalized(mut self) -> Self {
        self.path_mappings.retain(PathMapping::is_complete);
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_queue_items == 0 {
            return Err(SettingsError::Invalid(
                "max_queue_items must be at least 1".to_string(),
            ));
        }
        if self.max_history_items == 0 {
            return Err(SettingsError::Invalid(
                "max_history_items must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_seconds == 0 {
            return Err(SettingsError::Invalid(
                "poll_interval_seconds must be at least 1".to_string(),
            ));
        }
        if self.pre_buffer_ms > MAX_BUFFER_MS || self.post_buffer_ms > MAX_BUFFER_MS {
            return Err(SettingsError::Invalid(format!(
                "pre_buffer and post_buffer must not exceed {MAX_BUFFER_MS} ms"
            )));
        }
        // Same directory and no prefix would overwrite the source file.
        if self.output_directory.trim().is_empty() && self.output_prefix.is_empty() {
            return Err(SettingsError::Invalid(
                "output_prefix is required when output_directory is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial settings submitted by a client; merged onto the current snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub swears_file: Option<String>,
    pub output_prefix: Option<String>,
    pub output_directory: Option<String>,
    #[serde(rename = "bleeptool")]
    pub bleeptool_profile: Option<BleeptoolProfile>,
    pub boost_db: Option<i32>,
    #[serde(rename = "pre_buffer")]
    pub pre_buffer_ms: Option<u32>,
    #[serde(rename = "post_buffer")]
    pub post_buffer_ms: Option<u32>,
    pub use_beep: Option<bool>,
    pub beep_mode: Option<BeepMode>,
    pub retain_clips: Option<bool>,
    pub temp_dir: Option<String>,
    #[serde(default, deserialize_with = "mappings_json::deserialize_optional")]
    pub path_mappings: Option<Vec<PathMapping>>,
    #[serde(alias = "maxQueueItems")]
    pub max_queue_items: Option<usize>,
    #[serde(alias = "maxHistoryItems")]
    pub max_history_items: Option<usize>,
    pub poll_interval_seconds: Option<u64>,
}

impl SettingsUpdate {
    /// Builds the replacement snapshot. The base is left untouched.
    pub fn apply(self, base: &SettingsSnapshot) -> Result<SettingsSnapshot, SettingsError> {
        let base = base.clone();
        let next = SettingsSnapshot {
            swears_file: self.swears_file.unwrap_or(base.swears_file),
            output_prefix: self.output_prefix.unwrap_or(base.output_prefix),
            output_directory: self.output_directory.unwrap_or(base.output_directory),
            bleeptool_profile: self.bleeptool_profile.unwrap_or(base.bleeptool_profile),
            boost_db: self.boost_db.unwrap_or(base.boost_db),
            pre_buffer_ms: self.pre_buffer_ms.unwrap_or(base.pre_buffer_ms),
            post_buffer_ms: self.post_buffer_ms.unwrap_or(base.post_buffer_ms),
            use_beep: self.use_beep.unwrap_or(base.use_beep),
            beep_mode: self.beep_mode.unwrap_or(base.beep_mode),
            retain_clips: self.retain_clips.unwrap_or(base.retain_clips),
            temp_dir: self.temp_dir.unwrap_or(base.temp_dir),
            path_mappings: self.path_mappings.unwrap_or(base.path_mappings),
            max_queue_items: self.max_queue_items.unwrap_or(base.max_queue_items),
            max_history_items: self.max_history_items.unwrap_or(base.max_history_items),
            poll_interval_seconds: self
                .poll_interval_seconds
                .unwrap_or(base.poll_interval_seconds),
        }
        .normalized();

        next.validate()?;
        Ok(next)
    }
}

/// `path_mappings` travels as a JSON-encoded string field. Plain arrays are
/// accepted on input as well.
mod mappings_json {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::PathMapping;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        List(Vec<PathMapping>),
    }

    fn parse<E: de::Error>(raw: Raw) -> Result<Vec<PathMapping>, E> {
        match raw {
            Raw::Text(text) if text.trim().is_empty() => Ok(Vec::new()),
            Raw::Text(text) => serde_json::from_str(&text).map_err(E::custom),
            Raw::List(list) => Ok(list),
        }
    }

    pub fn serialize<S: Serializer>(mappings: &[PathMapping], s: S) -> Result<S::Ok, S::Error> {
        let json = serde_json::to_string(mappings).map_err(serde::ser::Error::custom)?;
        s.serialize_str(&json)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<PathMapping>, D::Error> {
        parse(Raw::deserialize(d)?)
    }

    pub fn deserialize_optional<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Vec<PathMapping>>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            Some(raw) => parse(raw).map(Some),
            None => Ok(None),
        }
    }
}
