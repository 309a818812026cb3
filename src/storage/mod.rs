//! Storage Engine Module
//!
//! This module provides the entry store for DataStacks: a single-lock map
//! from key to [`Entry`] with lazy TTL evaluation, plus an optional
//! background sweeper that reclaims expired entries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │            Mutex<HashMap<String, Entry>>                    │
//! │                                                             │
//! │   Entry = Scalar(String) | List(VecDeque<String>)           │
//! │           + ttl + created_at                                │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │ (optional)
//!              ┌─────────────┴─────────────┐
//!              │     ExpirySweeper         │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use datastacks::storage::{StorageEngine, StorageError, Value};
//! use std::time::Duration;
//!
//! let engine = StorageEngine::new();
//!
//! engine.set_scalar("name".into(), "Ariz".into(), Duration::ZERO);
//! assert_eq!(engine.get("name"), Some(Value::Scalar("Ariz".into())));
//!
//! // Lists cannot be pushed onto a scalar
//! assert_eq!(
//!     engine.push_back("name".into(), vec!["x".into()]),
//!     Err(StorageError::TypeMismatch("scalar"))
//! );
//! ```

pub mod engine;
pub mod expiry;

// Re-export commonly used types
pub use engine::{Entry, StorageEngine, StorageError, StorageStats, Value};
pub use expiry::{start_expiry_sweeper, ExpiryConfig, ExpirySweeper};
