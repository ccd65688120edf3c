use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::history::HistoryError;
use crate::report::{StatsService, WindowReport};

pub const NOT_FOUND_MESSAGE: &str =
    "I am not sure what you're looking for, but you're not going to find it here.";

pub struct AppState {
    pub stats: StatsService,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

fn failure_message(err: &HistoryError) -> String {
    format!("unable to retrieve listening history: {}", err)
}

/// Plain-text report of the most played tracks in the window
pub async fn listener_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.stats.report().await {
        Ok(report) => (StatusCode::OK, report.render_text()),
        Err(e) => {
            tracing::error!(error = %e, "failed to build listening report");
            (StatusCode::BAD_GATEWAY, failure_message(&e))
        }
    }
}

/// Same report as JSON
pub async fn top_tracks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WindowReport>, (StatusCode, Json<ErrorResponse>)> {
    match state.stats.report().await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!(error = %e, "failed to build listening report");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: failure_message(&e),
                }),
            ))
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}

/// Any path we don't serve
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
}
