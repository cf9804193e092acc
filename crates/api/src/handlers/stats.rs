use crate::{dto::StatsResponse, state::AppState};
use axum::{extract::State, Json};
use tracing::{debug, instrument};

#[instrument(skip(state), name = "api_get_stats")]
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let response = StatsResponse {
        uptime_secs: state.started_at.elapsed().as_secs(),
        zones: state
            .resolve_query
            .zones()
            .iter()
            .map(|zone| zone.to_string())
            .collect(),
        cached_pipelines: state.resolve_query.cached_pipelines(),
        notification_channels: state.hub.channel_count(),
    };

    debug!(
        cached_pipelines = response.cached_pipelines,
        channels = response.notification_channels,
        "Statistics retrieved"
    );

    Json(response)
}
