//! Admin handlers: two-phase resets and reboot, plus the log viewer.
//!
//! Calling an action without `?confirm=` returns a challenge token. Calling
//! it again with that token performs the action.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use bleeparr_core::{AdminAction, ConfirmationChallenge};

use super::error::ApiError;
use crate::log_buffer::LogEntry;
use crate::state::AppState;

const DEFAULT_LOG_ENTRIES: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub confirm: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub max_entries: Option<usize>,
}

/// First-phase response
#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub success: bool,
    pub confirmation_required: bool,
    pub message: String,
    #[serde(flatten)]
    pub challenge: ConfirmationChallenge,
}

/// Completed reset
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
    pub removed: usize,
}

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
}

fn challenge(state: &AppState, action: AdminAction) -> Response {
    let challenge = state.orchestrator().admin().request_confirmation(action);
    Json(ChallengeResponse {
        success: true,
        confirmation_required: true,
        message: format!("Repeat the request with ?confirm=<token> to {action}"),
        challenge,
    })
    .into_response()
}

/// Drop every queued item. Processing items finish normally.
pub async fn reset_queue(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ConfirmQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let Some(token) = query.confirm else {
        return Ok(challenge(&state, AdminAction::ResetQueue));
    };
    let removed = state.orchestrator().admin().reset_queue(&token)?;
    Ok(Json(ResetResponse {
        success: true,
        message: "Processing queue reset successfully".to_string(),
        removed,
    })
    .into_response())
}

/// Empty the processing history.
pub async fn reset_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ConfirmQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let Some(token) = query.confirm else {
        return Ok(challenge(&state, AdminAction::ResetHistory));
    };
    let removed = state.orchestrator().admin().reset_history(&token)?;
    Ok(Json(ResetResponse {
        success: true,
        message: "Processing history reset successfully".to_string(),
        removed,
    })
    .into_response())
}

/// Start a graceful reboot. Returns as soon as the drain has begun.
pub async fn reboot(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ConfirmQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let Some(token) = query.confirm else {
        return Ok(challenge(&state, AdminAction::Reboot));
    };
    // The reboot runs detached; its outcome is visible through /api/status.
    let _reboot = state.orchestrator().admin().reboot(&token)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            success: true,
            message: "Reboot started".to_string(),
        }),
    )
        .into_response())
}

/// Recent log lines, oldest first.
pub async fn get_logs(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<LogsResponse>, ApiError> {
    let Query(query) = query?;
    let max_entries = query.max_entries.unwrap_or(DEFAULT_LOG_ENTRIES);
    Ok(Json(LogsResponse {
        logs: state.logs().recent(max_entries),
    }))
}
