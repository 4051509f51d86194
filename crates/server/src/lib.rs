//! HTTP surface of the catalog: discovery documents, per-endpoint
//! descriptors and the generic invocation route.

mod body;
pub mod error;
mod routes;

pub use error::{HttpError, ServerError};

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::any;
use routescope_core::{Catalog, Dispatcher, HandlerRegistry, ServerConfig, SharedSessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Catalog>,
    dispatcher: Dispatcher,
    body_limit: usize,
}

impl AppState {
    pub fn new(catalog: Catalog, registry: HandlerRegistry, sessions: SharedSessionStore) -> Self {
        let catalog = Arc::new(catalog);
        let dispatcher = Dispatcher::new(catalog.clone(), registry, sessions);
        Self {
            catalog,
            dispatcher,
            body_limit: ServerConfig::default().body_limit,
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn sessions(&self) -> &SharedSessionStore {
        self.dispatcher.sessions()
    }
}

/// Every path goes through one handler; the catalog, not the router,
/// decides which endpoints exist.
pub fn build_router(state: AppState) -> Router {
    let limit = state.body_limit;
    Router::new()
        .route("/", any(routes::dispatch))
        .route("/{*path}", any(routes::dispatch))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Serve until `cancel` fires, purging expired sessions in the background.
pub async fn run_server(
    state: AppState,
    config: &ServerConfig,
    cancel: CancellationToken,
) -> Result<(), ServerError> {
    let state = state.with_body_limit(config.body_limit);
    let purge = spawn_session_purge(
        state.sessions().clone(),
        config.purge_interval,
        cancel.clone(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        "Serving catalog {} at {} on http://{}",
        state.catalog().config().root.display(),
        state.catalog().mount(),
        listener.local_addr()?
    );

    let shutdown = cancel.clone();
    let served = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await;

    cancel.cancel();
    let _ = purge.await;
    info!("Server stopped");
    served.map_err(ServerError::from)
}

fn spawn_session_purge(
    sessions: SharedSessionStore,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let purged = sessions.purge_expired();
                    if purged > 0 {
                        debug!("Purged {} expired sessions", purged);
                    }
                }
            }
        }
    })
}
