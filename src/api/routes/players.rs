use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::Player;
use crate::service::MergeReport;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/players", get(list_players))
        .route("/api/players/merge", post(merge_players))
}

#[derive(Debug, Deserialize)]
pub struct PlayerSearchParams {
    pub search: Option<String>,
}

async fn list_players(
    State(state): State<AppState>,
    Query(params): Query<PlayerSearchParams>,
) -> Result<Json<Vec<Player>>, ApiError> {
    let players = match params.search.as_deref() {
        Some(term) if !term.is_empty() => state.store.search_players(term),
        _ => state.store.list_players(),
    }
    .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(players))
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub source_id: String,
    pub target_id: String,
}

/// Merge two player records. Always answers with the full per-table report;
/// a partial failure is a 200 whose report carries the failed tables, so the
/// admin surface can show what needs a retry.
async fn merge_players(
    State(state): State<AppState>,
    Json(body): Json<MergeRequest>,
) -> Result<Json<MergeReport>, ApiError> {
    let report = state
        .merge()
        .merge(&body.source_id.into(), &body.target_id.into())?;
    Ok(Json(report))
}
