//! Filtered flag handlers.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use bleeparr_core::{FilterFlag, FilterKind};

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetFilteredQuery {
    pub filtered: Option<bool>,
}

fn parse_kind(kind: &str) -> Result<FilterKind, ApiError> {
    FilterKind::parse(kind)
        .ok_or_else(|| ApiError::not_found(format!("unknown item type: {kind}")))
}

/// List the filtered shows or movies.
pub async fn list_filtered(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<FilterFlag>>, ApiError> {
    let Path(kind) = path?;
    let kind = parse_kind(&kind)?;
    Ok(Json(state.orchestrator().list_filtered(kind)?))
}

/// Turn filtering on or off for one show or movie.
pub async fn set_filtered(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(String, u64)>, PathRejection>,
    query: Result<Query<SetFilteredQuery>, QueryRejection>,
) -> Result<Json<FilterFlag>, ApiError> {
    let Path((kind, id)) = path?;
    let Query(query) = query?;
    let kind = parse_kind(&kind)?;
    let filtered = query
        .filtered
        .ok_or_else(|| ApiError::bad_request("missing query parameter: filtered"))?;
    Ok(Json(state.orchestrator().set_filtered(kind, id, filtered)?))
}
