use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::SharedState,
};

/// Subscribe to the shared live SSE stream.
pub fn subscribe_live(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.live_sse().subscribe()
}

/// First event sent on a new connection.
pub async fn handshake_event(state: &SharedState) -> Option<ServerEvent> {
    let handshake = Handshake {
        stream: "live".into(),
        message: "live stream connected".into(),
        degraded: state.is_degraded().await,
    };
    ServerEvent::json(Some("handshake".to_string()), &handshake).ok()
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    first: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(first) = first {
            if tx.send(Ok(to_event(first))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "live SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!("Live SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}
