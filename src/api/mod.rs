//! REST API endpoints.
//!
//! Axum-based HTTP API for the admin surface: leaderboards, recalculation,
//! linkage, membership, manual overrides and player merges. Batch endpoints
//! return their aggregate reports verbatim so the caller can render exactly
//! which tournament or table needs attention, not just a binary result.

pub mod routes;
pub mod state;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::ServiceError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ServiceError::AlreadyLinked { .. } => ApiError::Conflict(err.to_string()),
            ServiceError::SelfMerge(_) => ApiError::BadRequest(err.to_string()),
            ServiceError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Build the API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::leagues::router())
        .merge(routes::tournaments::router())
        .merge(routes::players::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_mapping() {
        let api: ApiError = ServiceError::not_found("league", "l1").into();
        assert!(matches!(api, ApiError::NotFound(_)));

        let api: ApiError = ServiceError::AlreadyLinked {
            tournament_id: "t1".into(),
            league_id: "l1".into(),
        }
        .into();
        assert!(matches!(api, ApiError::Conflict(_)));

        let api: ApiError = ServiceError::SelfMerge("p1".into()).into();
        assert!(matches!(api, ApiError::BadRequest(_)));
    }
}
