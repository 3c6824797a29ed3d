//! Processing request handlers.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use bleeparr_core::{ProcessingView, QueueItem, SeriesSubmission};

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Response for a single admitted item
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub success: bool,
    pub message: String,
    pub item: QueueItem,
}

/// Response for a series-wide request
#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub submission: SeriesSubmission,
}

fn admitted(item: QueueItem) -> (StatusCode, Json<EnqueueResponse>) {
    let message = format!("Queued {} {}", item.title, item.detail);
    (
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            success: true,
            message: message.trim_end().to_string(),
            item,
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Queue, history and stats in one view.
pub async fn get_processing(State(state): State<Arc<AppState>>) -> Json<ProcessingView> {
    Json(state.orchestrator().processing())
}

/// Queue one episode.
pub async fn process_episode(
    State(state): State<Arc<AppState>>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<(StatusCode, Json<EnqueueResponse>), ApiError> {
    let Path(episode_id) = path?;
    let item = state.orchestrator().submit_episode(episode_id).await?;
    Ok(admitted(item))
}

/// Queue one movie.
pub async fn process_movie(
    State(state): State<Arc<AppState>>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<(StatusCode, Json<EnqueueResponse>), ApiError> {
    let Path(movie_id) = path?;
    let item = state.orchestrator().submit_movie(movie_id).await?;
    Ok(admitted(item))
}

/// Queue every episode of a series that has a file.
pub async fn process_series(
    State(state): State<Arc<AppState>>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<(StatusCode, Json<SeriesResponse>), ApiError> {
    let Path(series_id) = path?;
    let submission = state.orchestrator().submit_series(series_id).await?;
    let message = format!(
        "Queued {} episodes of {} ({} skipped)",
        submission.queued_count, submission.title, submission.skipped_count
    );
    Ok((
        StatusCode::ACCEPTED,
        Json(SeriesResponse {
            success: true,
            message,
            submission,
        }),
    ))
}
