use crate::{dto::ChannelEventsResponse, errors::ApiError, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{self, Stream};
use labelns_domain::notify_event::is_valid_channel;
use labelns_domain::{DomainError, NotifyEvent};
use serde_json::json;
use std::convert::Infallible;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, instrument, warn};

fn validate_channel(channel: &str) -> Result<(), ApiError> {
    if is_valid_channel(channel) {
        Ok(())
    } else {
        Err(DomainError::InvalidChannel(channel.to_string()).into())
    }
}

#[instrument(skip(state), name = "api_get_channel_events")]
pub async fn get_channel_events(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<Json<ChannelEventsResponse>, ApiError> {
    validate_channel(&channel)?;

    let events = state.hub.recent(&channel);
    debug!(channel = %channel, count = events.len(), "Channel history retrieved");

    Ok(Json(ChannelEventsResponse {
        count: events.len(),
        channel,
        events,
    }))
}

/// Live events as server-sent events. Each event's `data` is the JSON event.
#[instrument(skip(state), name = "api_stream_channel_events")]
pub async fn stream_channel_events(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<Response, ApiError> {
    validate_channel(&channel)?;

    let Some(receiver) = state.hub.subscribe(&channel) else {
        return Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "notification channel limit reached" })),
        )
            .into_response());
    };

    debug!(channel = %channel, "Subscriber attached");
    Ok(Sse::new(event_stream(channel, receiver))
        .keep_alive(KeepAlive::default())
        .into_response())
}

fn event_stream(
    channel: String,
    receiver: broadcast::Receiver<NotifyEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(
        (channel, receiver),
        |(channel, mut receiver)| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let sse = match Event::default().event("notify").json_data(&event) {
                            Ok(sse) => sse,
                            Err(e) => {
                                warn!(channel = %channel, error = %e, "Failed to encode event");
                                continue;
                            }
                        };
                        return Some((Ok(sse), (channel, receiver)));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(channel = %channel, skipped, "Subscriber lagged behind");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        },
    )
}
