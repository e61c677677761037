use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{match_store::MatchStore, storage::StorageError},
    services::sse_events,
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Reconnect to the storage backend and keep the shared state in degraded mode while it is
/// unavailable.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn MatchStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_match_store(store.clone()).await;
                sse_events::broadcast_system_status(&state, false);
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                loop {
                    match store.health_check().await {
                        Ok(()) => {
                            if state.is_degraded().await {
                                info!("storage healthy again; leaving degraded mode");
                                set_degraded(&state, false).await;
                            }
                            sleep(HEALTH_POLL_INTERVAL).await;
                        }
                        Err(_) => {
                            if reconnect(&state, store.as_ref()).await {
                                set_degraded(&state, false).await;
                                sleep(HEALTH_POLL_INTERVAL).await;
                                continue;
                            }
                            warn!("exhausted storage reconnect attempts; staying in degraded mode");
                            break;
                        }
                    }
                }

                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Retry the existing store a few times with back-off. Degraded mode starts after the first
/// failure.
async fn reconnect(state: &SharedState, store: &dyn MatchStore) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!("storage reconnection succeeded after health check failure");
                return true;
            }
            Err(reconnect_err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %reconnect_err,
                        "storage reconnect first attempt failed; entering in degraded mode"
                    );
                    set_degraded(state, true).await;
                } else {
                    warn!(attempt, error = %reconnect_err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}

async fn set_degraded(state: &SharedState, degraded: bool) {
    state.update_degraded(degraded).await;
    sse_events::broadcast_system_status(state, degraded);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, dao::match_store::memory::MemoryMatchStore, state::AppState};

    #[tokio::test]
    async fn installing_a_store_leaves_degraded_mode() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded().await);

        let mut watcher = state.degraded_watcher();
        let task = tokio::spawn(run(state.clone(), || async {
            Ok::<_, StorageError>(Arc::new(MemoryMatchStore::new()) as Arc<dyn MatchStore>)
        }));

        tokio::time::timeout(Duration::from_secs(2), watcher.wait_for(|degraded| !degraded))
            .await
            .unwrap()
            .unwrap();
        assert!(state.match_store().await.is_some());
        task.abort();
    }
}
