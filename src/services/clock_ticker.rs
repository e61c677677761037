use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    services::{live_service, sse_events},
    state::SharedState,
};

/// Spawn the countdown task of a live session.
///
/// The task ticks the clock once per configured interval and stops by itself once the clock
/// is no longer running or the session disappears.
pub fn spawn(state: SharedState, session_id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(state.config().tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;

            let Some(live) = state.session(session_id) else {
                debug!(session_id = %session_id, "session gone; countdown stops");
                break;
            };
            let mut guard = live.lock().await;

            let effects = match guard.clock_mut().tick() {
                Ok(effects) => effects,
                Err(err) => {
                    warn!(session_id = %session_id, error = %err, "countdown tick rejected");
                    break;
                }
            };
            sse_events::broadcast_clock_tick(&state, &guard);
            live_service::apply_effects(&state, &mut guard, effects).await;

            if !guard.clock().is_running() {
                debug!(session_id = %session_id, "clock stopped; countdown ends");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        config::{AppConfig, FriendlyDefaults},
        dto::common::LiveSnapshot,
        state::{
            AppState, LiveMatch,
            match_clock::MatchClock,
            rules::{FriendlyPolicy, MatchRules},
        },
    };

    #[tokio::test]
    async fn ticks_until_the_period_ends() {
        let config = AppConfig::default().with_tick_interval(Duration::from_millis(1));
        let state = AppState::new(config);
        let defaults = FriendlyDefaults {
            half_duration_minutes: 1,
            ..FriendlyDefaults::default()
        };
        let mut clock = MatchClock::new(MatchRules::friendly(&defaults, FriendlyPolicy::AllowDraw));
        clock.start().unwrap();
        let live = state.register_session(LiveMatch::friendly(Uuid::new_v4(), clock));
        let session_id = live.lock().await.id();
        let mut events = state.live_sse().subscribe();

        let handle = spawn(state.clone(), session_id);
        tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .unwrap()
            .unwrap();

        let snapshot = LiveSnapshot::from(&*live.lock().await);
        assert!(!snapshot.running);
        assert_eq!(snapshot.seconds_remaining, 60);

        let mut ticks = 0;
        let mut phase_changes = 0;
        while let Ok(event) = events.try_recv() {
            match event.event.as_deref() {
                Some("clock.tick") => ticks += 1,
                Some("phase_changed") => phase_changes += 1,
                _ => {}
            }
        }
        assert_eq!(ticks, 60);
        assert_eq!(phase_changes, 1);
    }

    #[tokio::test]
    async fn stops_when_the_session_is_removed() {
        let config = AppConfig::default().with_tick_interval(Duration::from_millis(1));
        let state = AppState::new(config);
        let mut clock = MatchClock::new(MatchRules::friendly(
            &FriendlyDefaults::default(),
            FriendlyPolicy::AllowDraw,
        ));
        clock.start().unwrap();
        let session_id = state
            .register_session(LiveMatch::friendly(Uuid::new_v4(), clock))
            .lock()
            .await
            .id();
        state.remove_session(session_id);

        tokio::time::timeout(Duration::from_secs(1), spawn(state, session_id))
            .await
            .unwrap()
            .unwrap();
    }
}
