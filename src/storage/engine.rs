//! Thread-Safe Entry Store with Lazy Expiry
//!
//! This module implements the core storage engine for DataStacks.
//! Every key maps to exactly one [`Entry`], which holds either a scalar
//! string or a list of strings, plus an optional time-to-live.
//!
//! ## Design Decisions
//!
//! 1. **One Lock**: The whole map sits behind a single `Mutex`. Every public
//!    operation takes the lock once and performs its full read-modify-write
//!    while holding it, so a push never interleaves with a concurrent
//!    overwrite of the same key.
//! 2. **Lazy Expiry**: A read of an expired entry reports it absent but does
//!    not remove it. Stale entries are reclaimed by overwrites, deletes,
//!    `clear()`, or the optional [`ExpirySweeper`](crate::storage::ExpirySweeper).
//! 3. **Sum-Typed Values**: [`Value`] is either `Scalar` or `List`, never both.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │        ┌─────────────────────────────────────────┐          │
//! │        │   Mutex<HashMap<String, Entry>>         │          │
//! │        └─────────────────────────────────────────┘          │
//! │   session task ──┐                                          │
//! │   session task ──┼──> lock ─> check/mutate ─> unlock        │
//! │   sweeper task ──┘                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors returned by mutating store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A list operation was attempted against a key holding another kind of value.
    #[error("list operation against a key holding a {0}")]
    TypeMismatch(&'static str),
}

/// The value held by an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A single string.
    Scalar(String),
    /// An ordered sequence of strings.
    List(VecDeque<String>),
}

impl Value {
    /// Returns the kind name, as reported in [`StorageError::TypeMismatch`].
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::List(_) => "list",
        }
    }
}

/// Represents a stored value with its expiry metadata.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The stored value
    pub value: Value,
    /// Time-to-live measured from `created_at` (None = never expires)
    pub ttl: Option<Duration>,
    /// When this entry was created or last replaced wholesale
    pub created_at: Instant,
}

impl Entry {
    /// Creates a new entry. A zero `ttl` means the entry never expires.
    pub fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            ttl: (!ttl.is_zero()).then_some(ttl),
            created_at: Instant::now(),
        }
    }

    /// Checks if this entry has expired.
    ///
    /// An entry whose age is exactly equal to its TTL is still live.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        self.ttl
            .map(|ttl| now.saturating_duration_since(self.created_at) > ttl)
            .unwrap_or(false)
    }
}

/// Which end of a list a push targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Front,
    Back,
}

/// The main storage engine for DataStacks.
///
/// Designed to be wrapped in an `Arc` and shared across all session tasks.
///
/// # Example
///
/// ```
/// use datastacks::storage::{StorageEngine, Value};
/// use std::time::Duration;
///
/// let engine = StorageEngine::new();
///
/// engine.set_scalar("name".to_string(), "Ariz".to_string(), Duration::ZERO);
/// assert_eq!(engine.get("name"), Some(Value::Scalar("Ariz".to_string())));
///
/// engine.push_back("queue".to_string(), vec!["a".to_string()]).unwrap();
/// engine.push_back("queue".to_string(), vec!["b".to_string()]).unwrap();
/// assert_eq!(
///     engine.get("queue"),
///     Some(Value::List(["a", "b"].iter().map(|s| s.to_string()).collect()))
/// );
/// ```
pub struct StorageEngine {
    data: Mutex<HashMap<String, Entry>>,

    get_count: AtomicU64,
    set_count: AtomicU64,
    del_count: AtomicU64,
    push_count: AtomicU64,
    expired_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("keys", &self.len())
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates an empty storage engine.
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
            push_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
        }
    }

    /// Acquires the store lock.
    ///
    /// Every critical section leaves the map consistent before it can panic,
    /// so a poisoned lock still guards valid data.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gets the live value for a key.
    ///
    /// Returns `None` if the key doesn't exist or its TTL has elapsed.
    /// An expired entry is left in place.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let data = self.lock();
        data.get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    /// Replaces (or creates) the entry for `key` with a scalar value.
    ///
    /// # Returns
    ///
    /// Returns `true` if no entry existed under the key before.
    pub fn set_scalar(&self, key: String, value: String, ttl: Duration) -> bool {
        self.insert(key, Entry::new(Value::Scalar(value), ttl))
    }

    /// Replaces (or creates) the entry for `key` with a list value.
    ///
    /// # Returns
    ///
    /// Returns `true` if no entry existed under the key before.
    pub fn set_list(&self, key: String, values: Vec<String>, ttl: Duration) -> bool {
        self.insert(key, Entry::new(Value::List(values.into()), ttl))
    }

    fn insert(&self, key: String, entry: Entry) -> bool {
        self.set_count.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(key, entry).is_none()
    }

    /// Pushes a value onto the tail of the list stored at `key`.
    ///
    /// If the key is absent or expired, a list (without expiry) holding every
    /// value of `values` in order is created. On a live list only the first
    /// value is appended and the rest are ignored. The `created_at` and TTL of
    /// an existing list are left untouched.
    ///
    /// # Returns
    /// The length of the list after the push.
    pub fn push_back(&self, key: String, values: Vec<String>) -> Result<usize, StorageError> {
        self.push(key, values, End::Back)
    }

    /// Pushes a value onto the head of the list stored at `key`.
    ///
    /// Creation follows [`push_back`](Self::push_back): a new list keeps the
    /// values in the order given. On a live list only the first value is
    /// prepended.
    ///
    /// # Returns
    /// The length of the list after the push.
    pub fn push_front(&self, key: String, values: Vec<String>) -> Result<usize, StorageError> {
        self.push(key, values, End::Front)
    }

    fn push(&self, key: String, values: Vec<String>, end: End) -> Result<usize, StorageError> {
        self.push_count.fetch_add(1, Ordering::Relaxed);

        let mut data = self.lock();

        match data.get_mut(&key) {
            Some(entry) if !entry.is_expired() => match &mut entry.value {
                Value::List(list) => {
                    if let Some(value) = values.into_iter().next() {
                        match end {
                            End::Back => list.push_back(value),
                            End::Front => list.push_front(value),
                        }
                    }
                    Ok(list.len())
                }
                other => Err(StorageError::TypeMismatch(other.kind())),
            },
            // An expired entry counts as absent, whatever its kind
            _ => {
                let len = values.len();
                data.insert(key, Entry::new(Value::List(values.into()), Duration::ZERO));
                Ok(len)
            }
        }
    }

    /// Deletes a key from the store.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key was present, `false` otherwise.
    pub fn delete(&self, key: &str) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);
        self.lock().remove(key).is_some()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns the number of stored entries, including expired ones that
    /// have not been reclaimed yet.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every expired entry.
    ///
    /// This is called by the background expiry sweeper.
    ///
    /// # Returns
    ///
    /// Returns the number of entries that were removed.
    pub fn cleanup_expired(&self) -> u64 {
        let now = Instant::now();
        let mut data = self.lock();
        let before = data.len();

        data.retain(|_, entry| !entry.is_expired_at(now));

        let removed = (before - data.len()) as u64;
        if removed > 0 {
            self.expired_count.fetch_add(removed, Ordering::Relaxed);
        }
        removed
    }

    /// Returns operation counters.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len() as u64,
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
            push_ops: self.push_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of entries currently stored
    pub keys: u64,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET/SETEX operations
    pub set_ops: u64,
    /// Total DEL operations
    pub del_ops: u64,
    /// Total PUSHBACK/PUSHFRONT operations
    pub push_ops: u64,
    /// Total expired entries reclaimed by the sweeper
    pub expired: u64,
}
