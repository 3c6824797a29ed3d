use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::{admin, filtered, handlers, middleware::metrics_middleware, processing, settings};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Dashboard static files path (configurable via env)
    let dashboard_dir =
        std::env::var("DASHBOARD_DIR").unwrap_or_else(|_| "frontend/dist".to_string());

    // API routes
    let api_routes = Router::new()
        // Health, config and status
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/status", get(handlers::get_status))
        // Processing
        .route("/processing", get(processing::get_processing))
        .route("/process/episode/{id}", post(processing::process_episode))
        .route("/process/movie/{id}", post(processing::process_movie))
        .route("/process/series/{id}", post(processing::process_series))
        // Filtered flags
        .route("/filtered/{kind}", get(filtered::list_filtered))
        .route("/filtered/{kind}/{id}", put(filtered::set_filtered))
        // Settings
        .route(
            "/settings",
            get(settings::get_settings).post(settings::update_settings),
        )
        // Admin
        .route("/admin/reset-queue", post(admin::reset_queue))
        .route("/admin/reset-history", post(admin::reset_history))
        .route("/admin/reboot", post(admin::reboot))
        .route("/admin/logs", get(admin::get_logs))
        .with_state(Arc::clone(&state));

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics))
        .with_state(state);

    // Serve dashboard with SPA fallback
    let index_path = format!("{}/index.html", dashboard_dir);
    let serve_dir = ServeDir::new(&dashboard_dir).fallback(ServeFile::new(&index_path));

    Router::new()
        .nest("/api", api_routes)
        .merge(metrics_routes)
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
