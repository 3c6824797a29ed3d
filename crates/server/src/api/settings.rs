//! Runtime settings handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use bleeparr_core::{SettingsSnapshot, SettingsUpdate};

use super::error::ApiError;
use crate::state::AppState;

/// Response after a settings update
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub success: bool,
    pub message: String,
    pub settings: SettingsSnapshot,
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsSnapshot> {
    Json(state.orchestrator().settings().as_ref().clone())
}

/// Merge the submitted fields onto the current snapshot.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let Json(update) = body.map_err(ApiError::invalid_settings)?;
    let settings = state.orchestrator().update_settings(update)?;
    Ok(Json(SettingsResponse {
        success: true,
        message: "Settings saved".to_string(),
        settings,
    }))
}
