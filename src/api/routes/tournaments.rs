use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Tournament, TournamentId, TournamentStatus};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tournaments/unlinked", get(list_unlinked))
        .route(
            "/api/leagues/:league_id/tournaments/:tournament_id/link",
            post(link),
        )
        .route(
            "/api/leagues/:league_id/tournaments/:tournament_id/unlink",
            post(unlink),
        )
}

#[derive(Debug, Serialize)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Tournament> for TournamentSummary {
    fn from(t: Tournament) -> Self {
        Self {
            id: t.id,
            name: t.name,
            status: t.status,
            created_at: t.created_at,
        }
    }
}

async fn list_unlinked(
    State(state): State<AppState>,
) -> Result<Json<Vec<TournamentSummary>>, ApiError> {
    let tournaments = state.linkage().list_unlinked()?;
    Ok(Json(
        tournaments.into_iter().map(TournamentSummary::from).collect(),
    ))
}

async fn link(
    State(state): State<AppState>,
    Path((league_id, tournament_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .linkage()
        .link(&league_id.into(), &tournament_id.into())?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unlink(
    State(state): State<AppState>,
    Path((league_id, tournament_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .linkage()
        .unlink(&league_id.into(), &tournament_id.into())?;
    Ok(StatusCode::NO_CONTENT)
}
