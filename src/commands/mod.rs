//! Command Handler Module
//!
//! This module implements the command processing layer for DataStacks.
//! It receives raw command lines, executes them against the storage engine,
//! and returns the reply to send back.
//!
//! ## Architecture
//!
//! ```text
//! Client line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │   tokenize()    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ StorageEngine   │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! `GET`, `SET`, `SETEX`, `PUSHBACK`, `PUSHFRONT`, `DEL`, `PING`, `DROPALL`

pub mod handler;

// Re-export the main command handler
pub use handler::{CommandError, CommandHandler};
