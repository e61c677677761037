use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::common::LiveSnapshot,
    state::match_clock::{Cue, Side},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Raw event with a preformatted data field.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a regular goal is added or removed.
pub struct GoalEvent {
    pub side: Side,
    /// `1` for a goal, `-1` for a correction.
    pub delta: i32,
    pub snapshot: LiveSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the scoreboard should play a cue.
pub struct CueEvent {
    pub session_id: Uuid,
    pub cue: Cue,
}

#[derive(Debug, Serialize, ToSchema)]
/// Transient user-visible notification (failed write, rejected action).
pub struct NoticeEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a live session is closed.
pub struct SessionClosedEvent {
    pub session_id: Uuid,
}
