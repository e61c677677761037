//! Matchday Back binary entrypoint wiring REST, SSE and the storage supervisor.

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchday_back::{
    config::AppConfig,
    dao::{
        match_store::{MatchStore, memory::MemoryMatchStore},
        storage::StorageError,
    },
    routes,
    services::{fixture_service, storage_supervisor},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let fixtures_path = config.fixtures_path().map(PathBuf::from);
    let app_state = AppState::new(config);

    spawn_storage(app_state.clone(), fixtures_path).await;
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Start the storage supervisor: MongoDB when `MONGO_URI` is set, the in-memory store otherwise.
///
/// Fixtures from `fixtures_path` are only loaded into the in-memory store.
async fn spawn_storage(state: SharedState, fixtures_path: Option<PathBuf>) {
    #[cfg(feature = "mongo-store")]
    {
        if let Ok(uri) = env::var("MONGO_URI") {
            use matchday_back::dao::match_store::mongodb::{MongoConfig, MongoMatchStore};

            let db_name = env::var("MONGO_DB").ok();
            info!("using MongoDB match store");
            if let Some(path) = &fixtures_path {
                warn!(
                    path = %path.display(),
                    "fixtures file ignored with MongoDB; use POST /fixtures instead"
                );
            }
            tokio::spawn(storage_supervisor::run(state, move || {
                let uri = uri.clone();
                let db_name = db_name.clone();
                async move {
                    let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
                    let store = MongoMatchStore::connect(config).await?;
                    Ok::<_, StorageError>(Arc::new(store) as Arc<dyn MatchStore>)
                }
            }));
            return;
        }
    }

    warn!("no database configured; results are kept in memory only");
    let store = MemoryMatchStore::new();
    if let Some(path) = fixtures_path {
        match fixture_service::read_bundle(&path) {
            Ok(bundle) => {
                if let Err(err) = fixture_service::seed(&store, &bundle).await {
                    warn!(path = %path.display(), error = %err, "failed to seed fixtures");
                }
            }
            Err(err) => warn!(path = %path.display(), error = %err, "fixtures file skipped"),
        }
    }
    tokio::spawn(storage_supervisor::run(state, move || {
        let store = store.clone();
        async move { Ok::<_, StorageError>(Arc::new(store) as Arc<dyn MatchStore>) }
    }));
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
