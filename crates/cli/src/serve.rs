use crate::CatalogArgs;
use routescope_core::{HandlerRegistry, InMemorySessionStore, ServerConfig};
use routescope_server::{AppState, run_server};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn run(
    catalog: CatalogArgs,
    bind: SocketAddr,
    session_ttl: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig {
        bind,
        session_ttl: Duration::from_secs(session_ttl),
        ..ServerConfig::default()
    };

    if !catalog.root.is_dir() {
        warn!(
            "Catalog root {} is not a directory, the catalog will be empty",
            catalog.root.display()
        );
    }

    let registry = HandlerRegistry::with_builtins();
    info!("Registered handlers: {}", registry.ids().join(", "));

    let sessions = Arc::new(InMemorySessionStore::new(config.session_ttl));
    let state = AppState::new(catalog.catalog(), registry, sessions);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down");
                shutdown.cancel();
            }
            Err(e) => warn!("Cannot listen for Ctrl+C: {}", e),
        }
    });

    run_server(state, &config, cancel).await?;
    Ok(())
}
