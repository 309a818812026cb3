//! Connection Handler Module
//!
//! This module manages individual client sessions with DataStacks.
//! Each client connection is handled by its own async task, so a slow or
//! misbehaving client never holds up the others.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                    (server.rs)                              │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        │ accept() + spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐                         │
//! │  │ Handshake   │───>│ AuthGate    │── reject ──> close      │
//! │  └─────────────┘    └──────┬──────┘                         │
//! │                            ▼                                │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │  │ Read line   │───>│ Execute cmd │───>│ Send reply  │      │
//! │  └─────────────┘    └─────────────┘    └─────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use datastacks::auth::AuthGate;
//! use datastacks::commands::CommandHandler;
//! use datastacks::connection::{handle_connection, ConnectionStats};
//! use datastacks::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(StorageEngine::new());
//! let auth = Arc::new(AuthGate::new("123"));
//! let stats = Arc::new(ConnectionStats::new());
//!
//! // For each accepted connection...
//! let (stream, addr) = listener.accept().await?;
//! let handler = CommandHandler::new(Arc::clone(&storage));
//! tokio::spawn(handle_connection(stream, addr, handler, auth.clone(), stats.clone()));
//! ```

pub mod handler;

// Re-export commonly used types
pub use handler::{
    handle_connection, ConnectionError, ConnectionHandler, ConnectionStats, SessionState,
};
