pub mod admin;
pub mod censor;
pub mod config;
pub mod dispatcher;
pub mod history;
pub mod library;
pub mod metrics;
pub mod orchestrator;
pub mod path_resolver;
pub mod queue;
pub mod settings;
pub mod status;
pub mod testing;

pub use admin::{AdminAction, AdminControl, AdminError, ConfirmationChallenge, RebootReport};
pub use censor::{BleeptoolConfig, BleeptoolEngine, CensorEngine, CensorError, CensorOutcome};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError,
    LibraryConnectionConfig, SanitizedConfig,
};
pub use dispatcher::{Dispatcher, DispatcherConfig, DispatcherStatus, DrainReport};
pub use history::{HistoryRecord, HistoryStore, ProcessingStats};
pub use library::{
    FilterFlag, FilterKind, FilterStore, LibraryError, MovieLibrary, RadarrClient, SeriesLibrary,
    SonarrClient, SqliteFilterStore,
};
pub use orchestrator::{Orchestrator, OrchestratorDeps, ProcessingView, SeriesSubmission, SubmitError};
pub use path_resolver::PathResolver;
pub use queue::{EnqueueRejection, ItemType, MediaItem, QueueItem, QueueManager};
pub use settings::{
    SettingsError, SettingsHandle, SettingsSnapshot, SettingsStore, SettingsUpdate,
    SqliteSettingsStore,
};
pub use status::{ServiceStatus, StatusAggregator, SystemStatus};
