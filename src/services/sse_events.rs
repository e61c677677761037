use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        common::LiveSnapshot,
        sse::{CueEvent, GoalEvent, NoticeEvent, ServerEvent, SessionClosedEvent, SystemStatus},
    },
    state::{
        LiveMatch, SharedState,
        match_clock::{Cue, Side},
    },
};

const EVENT_CLOCK_TICK: &str = "clock.tick";
const EVENT_PHASE_CHANGED: &str = "phase_changed";
const EVENT_GOAL: &str = "goal";
const EVENT_PENALTY: &str = "penalty";
const EVENT_CUE: &str = "cue";
const EVENT_NOTICE: &str = "notice";
const EVENT_SESSION_CLOSED: &str = "session.closed";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the clock after a countdown tick.
pub fn broadcast_clock_tick(state: &SharedState, live: &LiveMatch) {
    send_live_event(state, EVENT_CLOCK_TICK, &LiveSnapshot::from(live));
}

/// Broadcast the clock after a phase change.
pub fn broadcast_phase_changed(state: &SharedState, live: &LiveMatch) {
    send_live_event(state, EVENT_PHASE_CHANGED, &LiveSnapshot::from(live));
}

/// Broadcast a goal or a goal correction.
pub fn broadcast_goal(state: &SharedState, live: &LiveMatch, side: Side, delta: i32) {
    let payload = GoalEvent {
        side,
        delta,
        snapshot: LiveSnapshot::from(live),
    };
    send_live_event(state, EVENT_GOAL, &payload);
}

/// Broadcast the shoot-out after a kick.
pub fn broadcast_penalty(state: &SharedState, live: &LiveMatch) {
    send_live_event(state, EVENT_PENALTY, &LiveSnapshot::from(live));
}

/// Ask the scoreboard to play a cue.
pub fn broadcast_cue(state: &SharedState, session_id: Uuid, cue: Cue) {
    send_live_event(state, EVENT_CUE, &CueEvent { session_id, cue });
}

/// Send a transient notification to the operators.
pub fn broadcast_notice(state: &SharedState, session_id: Option<Uuid>, message: impl Into<String>) {
    let payload = NoticeEvent {
        session_id,
        message: message.into(),
    };
    send_live_event(state, EVENT_NOTICE, &payload);
}

/// Broadcast that a live session was closed.
pub fn broadcast_session_closed(state: &SharedState, session_id: Uuid) {
    send_live_event(state, EVENT_SESSION_CLOSED, &SessionClosedEvent { session_id });
}

/// Broadcast a degraded mode change.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_live_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_live_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.live_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize live SSE payload"),
    }
}
