use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bleeparr_core::config::LoggingConfig;
use bleeparr_core::{
    load_config, validate_config, BleeptoolEngine, CensorEngine, FilterStore, MovieLibrary,
    Orchestrator, OrchestratorDeps, RadarrClient, SeriesLibrary, SettingsStore, SonarrClient,
    SqliteFilterStore, SqliteSettingsStore,
};
use bleeparr_server::{create_router, AppState, LogBuffer};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging; the buffer backs /api/admin/logs
    let log_buffer = LogBuffer::new(LoggingConfig::default().buffer_lines);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(log_buffer.layer())
        .init();

    // Determine config path
    let config_path = std::env::var("BLEEPARR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    log_buffer.set_capacity(config.logging.buffer_lines);

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // SQLite stores (settings snapshot and filtered flags share one file)
    let settings_store: Arc<dyn SettingsStore> = Arc::new(
        SqliteSettingsStore::new(&config.database.path)
            .context("Failed to open settings store")?,
    );
    let filters: Arc<dyn FilterStore> = Arc::new(
        SqliteFilterStore::new(&config.database.path).context("Failed to open filter store")?,
    );
    info!("Stores initialized");

    // Library managers
    let sonarr: Option<Arc<dyn SeriesLibrary>> = match &config.sonarr {
        Some(sonarr_config) => match SonarrClient::new(sonarr_config) {
            Ok(client) => {
                info!("Initializing Sonarr client at {}", sonarr_config.url);
                Some(Arc::new(client))
            }
            Err(e) => {
                error!("Failed to create Sonarr client: {}", e);
                None
            }
        },
        None => {
            info!("Sonarr not configured");
            None
        }
    };

    let radarr: Option<Arc<dyn MovieLibrary>> = match &config.radarr {
        Some(radarr_config) => match RadarrClient::new(radarr_config) {
            Ok(client) => {
                info!("Initializing Radarr client at {}", radarr_config.url);
                Some(Arc::new(client))
            }
            Err(e) => {
                error!("Failed to create Radarr client: {}", e);
                None
            }
        },
        None => {
            info!("Radarr not configured");
            None
        }
    };

    // Censor engine
    let engine = Arc::new(BleeptoolEngine::new(config.censor.clone()));
    if let Err(e) = engine.validate().await {
        warn!("Censor tool check failed, jobs will fail until fixed: {}", e);
    }

    let orchestrator = Arc::new(
        Orchestrator::new(
            &config,
            OrchestratorDeps {
                settings_store,
                filters,
                engine,
                sonarr,
                radarr,
            },
        )
        .context("Failed to load settings")?,
    );
    orchestrator.start().await;
    info!("Dispatcher started");

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&orchestrator),
        log_buffer,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    let report = orchestrator.stop().await;
    info!(
        "Dispatcher stopped ({} drained, {} aborted)",
        report.completed,
        report.forced.len()
    );

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
