//! Live-play orchestration: opening matches, driving their clock and persisting results.

use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{MatchEntity, MatchFilter, MatchPatch},
    dto::{
        common::LiveSnapshot,
        live::{FriendlyRequest, LiveActionResponse},
    },
    error::ServiceError,
    services::{access::owned_tournament, clock_ticker, sse_events},
    state::{
        LiveMatch, OwnerSession, SharedLiveMatch, SharedState,
        match_clock::{
            ClockEffect, ClockError, ClockEvent, GoalChange, InvalidTransition, MatchClock,
            PhaseEndReason, Score, Side,
        },
        rules::MatchRules,
    },
};

/// Open a stored match for live play.
///
/// Opening a match that already has a live session returns that session.
pub async fn open_match(
    state: &SharedState,
    session: OwnerSession,
    match_id: Uuid,
) -> Result<LiveSnapshot, ServiceError> {
    if let Some(live) = state.session(match_id) {
        let guard = owned(&live, session).await?;
        return Ok(LiveSnapshot::from(&*guard));
    }

    let store = state.require_match_store().await?;
    let entity = store
        .find_match(match_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{match_id}`")))?;
    let tournament_id = entity.tournament_id.ok_or_else(|| {
        ServiceError::Forbidden(format!("match `{match_id}` has no owning tournament"))
    })?;
    let tournament = owned_tournament(store.as_ref(), session, tournament_id).await?;
    tournament.validate().map_err(|err| {
        ServiceError::InvalidState(format!("tournament configuration is invalid: {err}"))
    })?;

    let first_leg = if tournament.two_legged && entity.leg == Some(2) {
        let siblings = store
            .list_matches(
                tournament_id,
                MatchFilter {
                    elimination_only: false,
                },
            )
            .await?;
        first_leg_of(&entity, siblings)
    } else {
        None
    };

    let rules = MatchRules::for_match(&tournament, &entity, first_leg.as_ref());
    let clock = MatchClock::resume(
        rules,
        Score {
            a: entity.goals_a,
            b: entity.goals_b,
        },
        entity.closed,
        entity.penalties,
    );

    let live = state.register_session(LiveMatch::stored(session.owner_id, match_id, clock));
    let guard = owned(&live, session).await?;
    info!(
        session_id = %match_id,
        tie_break = ?rules.tie_break,
        closed = entity.closed,
        "match opened for live play"
    );
    Ok(LiveSnapshot::from(&*guard))
}

/// Open an ad-hoc match using the configured defaults; it is never persisted.
pub async fn open_friendly(
    state: &SharedState,
    session: OwnerSession,
    request: FriendlyRequest,
) -> Result<LiveSnapshot, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    let mut defaults = *state.config().friendly();
    if let Some(minutes) = request.half_duration_minutes {
        defaults.half_duration_minutes = minutes;
    }
    if let Some(minutes) = request.extra_time_minutes {
        defaults.extra_time_minutes = minutes;
    }
    if let Some(kicks) = request.penalty_kicks {
        defaults.penalty_kicks = kicks;
    }

    let rules = MatchRules::friendly(&defaults, request.policy);
    let live = state.register_session(LiveMatch::friendly(
        session.owner_id,
        MatchClock::new(rules),
    ));
    let guard = live.lock().await;
    info!(session_id = %guard.id(), policy = ?request.policy, "friendly match opened");
    Ok(LiveSnapshot::from(&*guard))
}

/// Current state of a live session.
pub async fn snapshot(
    state: &SharedState,
    session: OwnerSession,
    session_id: Uuid,
) -> Result<LiveSnapshot, ServiceError> {
    let live = find(state, session_id)?;
    let guard = owned(&live, session).await?;
    Ok(LiveSnapshot::from(&*guard))
}

/// Start the countdown, replacing any countdown task already running for the session.
pub async fn start_clock(
    state: &SharedState,
    session: OwnerSession,
    session_id: Uuid,
) -> Result<LiveActionResponse, ServiceError> {
    let live = find(state, session_id)?;
    let mut guard = owned(&live, session).await?;

    if let Err(err) = guard.clock_mut().start() {
        return Err(reject(state, &guard, err));
    }
    guard.replace_ticker(clock_ticker::spawn(state.clone(), session_id));
    debug!(session_id = %session_id, "countdown started");

    Ok(respond(&guard, None))
}

/// Pause the countdown.
pub async fn pause_clock(
    state: &SharedState,
    session: OwnerSession,
    session_id: Uuid,
) -> Result<LiveActionResponse, ServiceError> {
    let live = find(state, session_id)?;
    let mut guard = owned(&live, session).await?;

    if let Err(err) = guard.clock_mut().pause() {
        return Err(reject(state, &guard, err));
    }
    guard.stop_ticker();
    debug!(session_id = %session_id, "countdown paused");

    Ok(respond(&guard, None))
}

/// Add (`delta = 1`) or remove (`delta = -1`) a regular goal.
pub async fn adjust_goal(
    state: &SharedState,
    session: OwnerSession,
    session_id: Uuid,
    side: Side,
    delta: i32,
) -> Result<LiveActionResponse, ServiceError> {
    let change = match delta {
        1 => GoalChange::Increment,
        -1 => GoalChange::Decrement,
        other => {
            return Err(ServiceError::InvalidInput(format!(
                "goal delta must be +1 or -1 (got {other})"
            )));
        }
    };

    let live = find(state, session_id)?;
    let mut guard = owned(&live, session).await?;

    let effects = match guard.clock_mut().adjust_goal(side, change) {
        Ok(effects) => effects,
        Err(err) => return Err(reject(state, &guard, err)),
    };
    sse_events::broadcast_goal(state, &guard, side, delta);
    let persisted = apply_effects(state, &mut guard, effects).await;

    Ok(respond(&guard, persisted))
}

/// End the current period before the countdown runs out. Without `confirm` nothing happens.
pub async fn end_period(
    state: &SharedState,
    session: OwnerSession,
    session_id: Uuid,
    confirm: bool,
) -> Result<LiveActionResponse, ServiceError> {
    let live = find(state, session_id)?;
    let mut guard = owned(&live, session).await?;

    let reason = PhaseEndReason::ManualConfirm { confirmed: confirm };
    let effects = match guard.clock_mut().request_phase_end(reason) {
        Ok(effects) => effects,
        Err(err) => return Err(reject(state, &guard, err)),
    };
    guard.stop_ticker();
    let persisted = apply_effects(state, &mut guard, effects).await;

    Ok(respond(&guard, persisted))
}

/// Record one shoot-out kick.
pub async fn take_penalty(
    state: &SharedState,
    session: OwnerSession,
    session_id: Uuid,
    side: Side,
    converted: bool,
) -> Result<LiveActionResponse, ServiceError> {
    let live = find(state, session_id)?;
    let mut guard = owned(&live, session).await?;

    let effects = match guard.clock_mut().take_penalty(side, converted) {
        Ok(effects) => effects,
        Err(err) => return Err(reject(state, &guard, err)),
    };
    sse_events::broadcast_penalty(state, &guard);
    let persisted = apply_effects(state, &mut guard, effects).await;

    Ok(respond(&guard, persisted))
}

/// Close the match now. On a match that is already closed, retries a final write that failed.
pub async fn end_match(
    state: &SharedState,
    session: OwnerSession,
    session_id: Uuid,
) -> Result<LiveActionResponse, ServiceError> {
    let live = find(state, session_id)?;
    let mut guard = owned(&live, session).await?;

    if guard.clock().is_closed() {
        let Some(patch) = guard.pending_write().cloned() else {
            return Err(reject(state, &guard, ClockError::Closed));
        };
        info!(session_id = %session_id, "retrying final result write");
        let persisted = persist(state, &mut guard, patch).await;
        return Ok(respond(&guard, persisted));
    }

    let effects = match guard.clock_mut().end_match() {
        Ok(effects) => effects,
        Err(err) => return Err(reject(state, &guard, err)),
    };
    guard.stop_ticker();
    let persisted = apply_effects(state, &mut guard, effects).await;

    Ok(respond(&guard, persisted))
}

/// Reopen a closed match: storage first, then the local clock. A failed storage call leaves
/// the session untouched.
pub async fn reopen_match(
    state: &SharedState,
    session: OwnerSession,
    session_id: Uuid,
) -> Result<LiveActionResponse, ServiceError> {
    let live = find(state, session_id)?;
    let mut guard = owned(&live, session).await?;

    let phase = guard.clock().phase();
    if !guard.clock().is_closed() {
        let err = ClockError::InvalidTransition(InvalidTransition {
            from: phase,
            event: ClockEvent::Reopen,
        });
        return Err(reject(state, &guard, err));
    }

    let persisted = match guard.match_id() {
        Some(match_id) => {
            let result = match state.match_store().await {
                Some(store) => store.reopen_match(match_id).await.map_err(ServiceError::from),
                None => Err(ServiceError::Degraded),
            };
            if let Err(err) = result {
                warn!(session_id = %session_id, error = %err, "failed to reopen match in storage");
                sse_events::broadcast_notice(
                    state,
                    Some(session_id),
                    "could not reopen the match; try again",
                );
                return Err(err);
            }
            Some(true)
        }
        None => None,
    };

    let effects = match guard.clock_mut().reopen() {
        Ok(effects) => effects,
        Err(err) => return Err(reject(state, &guard, err)),
    };
    guard.clear_pending_write();
    apply_effects(state, &mut guard, effects).await;
    info!(session_id = %session_id, "match reopened");

    Ok(respond(&guard, persisted))
}

/// Stop the countdown and forget the session.
pub async fn close_session(
    state: &SharedState,
    session: OwnerSession,
    session_id: Uuid,
) -> Result<(), ServiceError> {
    let live = find(state, session_id)?;
    {
        let mut guard = owned(&live, session).await?;
        guard.stop_ticker();
        if guard.pending_write().is_some() {
            warn!(session_id = %session_id, "closing session with an unsaved final result");
        }
    }

    state.remove_session(session_id);
    sse_events::broadcast_session_closed(state, session_id);
    info!(session_id = %session_id, "live session closed");
    Ok(())
}

/// Broadcast the effects of a clock operation and run the requested write.
///
/// Returns the outcome of the write, `None` when nothing was written.
pub(crate) async fn apply_effects(
    state: &SharedState,
    live: &mut LiveMatch,
    effects: Vec<ClockEffect>,
) -> Option<bool> {
    let mut persisted = None;

    for effect in effects {
        match effect {
            ClockEffect::PhaseChanged { from, to } => {
                info!(session_id = %live.id(), ?from, ?to, "phase changed");
                sse_events::broadcast_phase_changed(state, live);
            }
            ClockEffect::Cue(cue) => sse_events::broadcast_cue(state, live.id(), cue),
            ClockEffect::Persist(patch) => persisted = persist(state, live, patch).await,
        }
    }

    persisted
}

/// Write `patch` for the stored match behind `live`. A failure is kept as the pending write.
async fn persist(state: &SharedState, live: &mut LiveMatch, patch: MatchPatch) -> Option<bool> {
    let match_id = live.match_id()?;

    let result = match state.match_store().await {
        Some(store) => store
            .update_match(match_id, patch.clone())
            .await
            .map_err(ServiceError::from),
        None => Err(ServiceError::Degraded),
    };

    match result {
        Ok(()) => {
            live.clear_pending_write();
            info!(session_id = %live.id(), match_id = %match_id, "final result saved");
            Some(true)
        }
        Err(err) => {
            warn!(
                session_id = %live.id(),
                match_id = %match_id,
                error = %err,
                "failed to save final result"
            );
            live.set_pending_write(patch);
            sse_events::broadcast_notice(
                state,
                Some(live.id()),
                "the result could not be saved; end the match again to retry",
            );
            Some(false)
        }
    }
}

/// Leg 1 of the tie `second_leg` belongs to; a leg without a marker counts as leg 1.
fn first_leg_of(second_leg: &MatchEntity, siblings: Vec<MatchEntity>) -> Option<MatchEntity> {
    let pairing_id = second_leg.pairing_id.as_deref()?;
    siblings.into_iter().find(|candidate| {
        candidate.id != second_leg.id
            && candidate.pairing_id.as_deref() == Some(pairing_id)
            && candidate.leg != Some(2)
    })
}

fn find(state: &SharedState, session_id: Uuid) -> Result<SharedLiveMatch, ServiceError> {
    state
        .session(session_id)
        .ok_or_else(|| ServiceError::NotFound(format!("live session `{session_id}`")))
}

async fn owned(
    live: &SharedLiveMatch,
    session: OwnerSession,
) -> Result<MutexGuard<'_, LiveMatch>, ServiceError> {
    let guard = live.lock().await;
    if guard.owner_id() != session.owner_id {
        return Err(ServiceError::Forbidden(
            "live session belongs to another owner".into(),
        ));
    }
    Ok(guard)
}

fn reject(state: &SharedState, live: &LiveMatch, err: ClockError) -> ServiceError {
    debug!(session_id = %live.id(), error = %err, "live action rejected");
    sse_events::broadcast_notice(state, Some(live.id()), err.to_string());
    ServiceError::Rejected(err)
}

fn respond(live: &LiveMatch, persisted: Option<bool>) -> LiveActionResponse {
    LiveActionResponse {
        snapshot: LiveSnapshot::from(live),
        persisted,
    }
}
