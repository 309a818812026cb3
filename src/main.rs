//! DataStacks - A Password-Gated In-Memory Key-Value Store
//!
//! This is the main entry point for the DataStacks server.
//! It reads the configuration, sets up logging and the shared state,
//! and serves connections until Ctrl+C.

use clap::Parser;
use datastacks::server::{self, ServerState};
use datastacks::storage::start_expiry_sweeper;
use datastacks::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn print_banner(config: &Config) {
    println!(
        r#"
DataStacks v{} - In-Memory Key-Value Store
──────────────────────────────────────────────────────────────
Server started on {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        datastacks::VERSION,
        config.bind_address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "datastacks=info".into()),
        )
        .with_target(false)
        .init();

    let state = ServerState::new(&config.password);
    info!("Password digest computed");

    let sweeper = start_expiry_sweeper(Arc::clone(&state.storage), config.sweep_interval());
    if sweeper.is_none() {
        info!("Background expiry sweeper disabled, expiry is lazy only");
    }

    let listener = TcpListener::bind(config.bind_address()).await?;
    print_banner(&config);
    info!("Listening on {}", config.bind_address());

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let storage = Arc::clone(&state.storage);
    server::run(listener, state, shutdown).await;

    let stats = storage.stats();
    info!(
        keys = stats.keys,
        gets = stats.get_ops,
        sets = stats.set_ops,
        dels = stats.del_ops,
        pushes = stats.push_ops,
        expired = stats.expired,
        "Server shutdown complete"
    );
    Ok(())
}
