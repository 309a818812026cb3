//! # DataStacks - A Password-Gated In-Memory Key-Value Store
//!
//! DataStacks keeps string and list values in memory and serves them over a
//! plain-text, line-oriented TCP protocol. Clients authenticate with a
//! shared password, then send one command per line and get one reply line back.
//!
//! ## Features
//!
//! - **Simple Protocol**: Space-separated tokens, double quotes group spaces
//! - **Scalars and Lists**: Each key holds a string or an ordered list of strings
//! - **TTL Support**: Keys can expire; expiry is evaluated lazily on read
//! - **Shared-Secret Auth**: SHA-256 digest comparison during a JSON handshake
//! - **Async I/O**: Built on Tokio, one task per connected client
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                             DataStacks                                  │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │                     ┌─────────────┐    ┌──────────────────────────┐     │
//! │                     │  AuthGate   │    │      StorageEngine       │     │
//! │                     │  (SHA-256)  │    │ Mutex<HashMap<_, Entry>> │     │
//! │                     └─────────────┘    └────────────▲─────────────┘     │
//! │                                                     │ (optional)        │
//! │                                        ┌────────────┴─────────────┐     │
//! │                                        │      ExpirySweeper       │     │
//! │                                        └──────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use datastacks::server::{self, ServerState};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let state = ServerState::new("123");
//!     let listener = TcpListener::bind("127.0.0.1:3008").await?;
//!     server::run(listener, state, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await;
//!     Ok(())
//! }
//! ```
//!
//! ## Session Example
//!
//! ```text
//! > {"password": "123"}
//! OK
//! > SET foo "bar"
//! OK
//! > GET foo
//! "bar"
//! > PUSHBACK list "a"
//! OK
//! > PUSHBACK list "b"
//! OK
//! > GET list
//! "a" "b"
//! > PING
//! PONG
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: Tokenizer, reply types and handshake message
//! - [`storage`]: Thread-safe entry store with TTL support
//! - [`commands`]: Command dispatch and handlers
//! - [`connection`]: Client session management
//! - [`auth`]: Password digest and verification
//! - [`server`]: Accept loop
//! - [`config`]: Command-line and environment configuration

pub mod auth;
pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use auth::AuthGate;
pub use commands::CommandHandler;
pub use config::Config;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{tokenize, Handshake, Reply};
pub use server::ServerState;
pub use storage::{start_expiry_sweeper, ExpiryConfig, ExpirySweeper, StorageEngine, Value};

/// The default port DataStacks listens on
pub const DEFAULT_PORT: u16 = 3008;

/// The default host DataStacks binds to (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// The password used when none is configured
pub const DEFAULT_PASSWORD: &str = "123";

/// Version of DataStacks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
