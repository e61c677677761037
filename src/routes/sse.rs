use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/live",
    tag = "sse",
    responses(
        (
            status = 200,
            description = "Live scoreboard events",
            content_type = "text/event-stream",
            body = String
        )
    )
)]
/// Stream clock ticks, goals, cues and notices of every live session.
pub async fn live_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = sse_service::subscribe_live(&state);
    info!("New live SSE connection");
    let handshake = sse_service::handshake_event(&state).await;
    sse_service::to_sse_stream(receiver, handshake)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/live", get(live_stream))
}
