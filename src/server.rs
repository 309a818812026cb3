//! TCP Server
//!
//! Accepts connections and runs one session task per client until the
//! shutdown future resolves.

use crate::auth::AuthGate;
use crate::commands::CommandHandler;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::StorageEngine;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// State shared by every session.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub storage: Arc<StorageEngine>,
    pub auth: Arc<AuthGate>,
    pub stats: Arc<ConnectionStats>,
}

impl ServerState {
    /// Creates an empty store gated by `password`.
    pub fn new(password: &str) -> Self {
        Self {
            storage: Arc::new(StorageEngine::new()),
            auth: Arc::new(AuthGate::new(password)),
            stats: Arc::new(ConnectionStats::new()),
        }
    }
}

/// Serves clients from `listener` until `shutdown` completes.
///
/// Sessions already running are not awaited; they end with the runtime.
pub async fn run(listener: TcpListener, state: ServerState, shutdown: impl Future<Output = ()>) {
    tokio::select! {
        _ = accept_loop(listener, state) => {}
        _ = shutdown => {
            info!("Shutdown signal received, stopping server...");
        }
    }
}

/// Main loop that accepts incoming connections
async fn accept_loop(listener: TcpListener, state: ServerState) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let handler = CommandHandler::new(Arc::clone(&state.storage));
                let auth = Arc::clone(&state.auth);
                let stats = Arc::clone(&state.stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, auth, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
