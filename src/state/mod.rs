pub mod live;
pub mod match_clock;
pub mod rules;
pub mod shootout;
mod sse;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, watch};
use uuid::Uuid;

use crate::{config::AppConfig, dao::match_store::MatchStore, error::ServiceError};

pub use self::live::{LiveMatch, OwnerSession};
pub use self::sse::SseHub;

/// Application state shared by handlers and background tasks.
pub type SharedState = Arc<AppState>;

/// Live session guarded for exclusive access by handlers and its countdown task.
pub type SharedLiveMatch = Arc<Mutex<LiveMatch>>;

/// Central application state storing live sessions, the SSE hub and the storage handle.
pub struct AppState {
    match_store: RwLock<Option<Arc<dyn MatchStore>>>,
    sse: SseHub,
    sessions: DashMap<Uuid, SharedLiveMatch>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            match_store: RwLock::new(None),
            sse: SseHub::new(config.sse_capacity()),
            sessions: DashMap::new(),
            degraded: degraded_tx,
            config,
        })
    }

    /// Obtain a handle to the current match store, if one is installed.
    pub async fn match_store(&self) -> Option<Arc<dyn MatchStore>> {
        let guard = self.match_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current match store, or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_match_store(&self) -> Result<Arc<dyn MatchStore>, ServiceError> {
        self.match_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new match store implementation and leave degraded mode.
    pub async fn set_match_store(&self, store: Arc<dyn MatchStore>) {
        {
            let mut guard = self.match_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Broadcast hub used for the live SSE stream.
    pub fn live_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Live session registered under `id`.
    pub fn session(&self, id: Uuid) -> Option<SharedLiveMatch> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Register `live` unless a session with the same id already exists; returns the
    /// registered session either way.
    pub fn register_session(&self, live: LiveMatch) -> SharedLiveMatch {
        self.sessions
            .entry(live.id())
            .or_insert_with(|| Arc::new(Mutex::new(live)))
            .value()
            .clone()
    }

    /// Remove the session registered under `id`.
    pub fn remove_session(&self, id: Uuid) -> Option<SharedLiveMatch> {
        self.sessions.remove(&id).map(|(_, live)| live)
    }

    /// Number of open live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
