use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{LeaderboardEntry, LeagueId, LeagueMember, MemberRole, PlayerId};
use crate::service::{MemberSpec, RecalculationReport};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/leagues/:league_id/leaderboard", get(get_leaderboard))
        .route("/api/leagues/:league_id/recalculate", post(recalculate))
        .route(
            "/api/leagues/:league_id/players/:player_id/points",
            put(set_points),
        )
        .route(
            "/api/leagues/:league_id/members",
            get(list_members).post(add_members),
        )
        .route(
            "/api/leagues/:league_id/members/:player_id",
            axum::routing::delete(remove_member),
        )
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub league_id: LeagueId,
    pub entries: Vec<LeaderboardEntry>,
}

async fn get_leaderboard(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let league_id: LeagueId = league_id.into();
    state
        .store
        .read_league(&league_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("league not found: {league_id}")))?;

    let entries = state
        .store
        .read_leaderboard(&league_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(LeaderboardResponse { league_id, entries }))
}

#[derive(Debug, Deserialize)]
pub struct RecalculateParams {
    #[serde(default)]
    pub force: bool,
}

async fn recalculate(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
    Query(params): Query<RecalculateParams>,
) -> Result<Json<RecalculationReport>, ApiError> {
    let report = state
        .leaderboard()
        .full_update(&league_id.into(), params.force)?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct SetPointsRequest {
    pub total_points: i64,
}

async fn set_points(
    State(state): State<AppState>,
    Path((league_id, player_id)): Path<(String, String)>,
    Json(body): Json<SetPointsRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .leaderboard()
        .set_points(&league_id.into(), &player_id.into(), body.total_points)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub player_id: Option<String>,
    pub name: Option<String>,
    pub role: Option<MemberRole>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AddMembersRequest {
    pub members: Vec<AddMemberRequest>,
}

async fn add_members(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
    Json(body): Json<AddMembersRequest>,
) -> Result<Json<Vec<LeagueMember>>, ApiError> {
    let specs: Vec<MemberSpec> = body
        .members
        .into_iter()
        .map(|m| MemberSpec {
            player_id: m.player_id.map(PlayerId::from),
            name: m.name,
            role: m.role,
            is_active: m.is_active,
        })
        .collect();
    let members = state.membership().add_members(&league_id.into(), &specs)?;
    Ok(Json(members))
}

async fn list_members(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
) -> Result<Json<Vec<LeagueMember>>, ApiError> {
    let members = state.membership().list_members(&league_id.into())?;
    Ok(Json(members))
}

async fn remove_member(
    State(state): State<AppState>,
    Path((league_id, player_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .membership()
        .remove_member(&league_id.into(), &player_id.clone().into())?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "league member not found: {player_id}"
        )))
    }
}
