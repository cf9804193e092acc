use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .route(
            "/channels/{channel}/events",
            get(handlers::get_channel_events),
        )
        .route(
            "/channels/{channel}/stream",
            get(handlers::stream_channel_events),
        )
        .with_state(state)
}
