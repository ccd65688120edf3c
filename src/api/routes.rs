use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::report::StatsService;

use super::handlers::{health_check, listener_stats, not_found, top_tracks, AppState};

pub fn create_api_router(stats: StatsService) -> Router {
    let state = Arc::new(AppState { stats });

    Router::new()
        .route("/listenerStats", get(listener_stats))
        .route("/api/top-tracks", get(top_tracks))
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
