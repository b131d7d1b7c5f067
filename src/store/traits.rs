//! Store trait and error types
//!
//! This module defines the trait interface for backing-store implementations
//! and the error taxonomy shared by every tracker component.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while tracking crawl state
#[derive(Debug, Error)]
pub enum StateError {
    /// Transport or connection failure talking to the backing store.
    /// Never retried internally; retry policy belongs to the caller.
    #[error("Store connection error: {0}")]
    Connectivity(#[from] redis::RedisError),

    /// A stored value could not be interpreted as expected, e.g. a visit
    /// counter that is not an integer. Never coerced to zero.
    #[error("Malformed state at {key}: {value:?}")]
    MalformedState { key: String, value: String },

    /// A resource has been visited more often than the configured ceiling
    /// allows within the current window. A domain signal, not a failure;
    /// callers must branch on it explicitly.
    #[error("Visit limit reached: {count} visits recorded, {limit} allowed")]
    LimitReached { count: u64, limit: u64 },

    /// The request queue has no entries left. An expected exhaustion
    /// condition, distinguishable from a connectivity failure.
    #[error("Request queue is empty")]
    EmptyQueue,

    /// The visit count was recorded but the expiry refresh that follows it
    /// failed. The counter now ages out on its previous deadline (or never,
    /// if it was just created); callers can retry the expiry alone.
    #[error("Visit recorded but expiry refresh failed for {key}")]
    ExpiryRefresh {
        key: String,
        #[source]
        source: Box<StateError>,
    },
}

/// Result type for crawl-state operations
pub type StateResult<T> = Result<T, StateError>;

/// Trait for backing key-value store implementations
///
/// This is the complete primitive set the tracker composes over. Each
/// method maps to one atomic store command; the trait adds no ordering
/// across keys or across calls. Every method may block on network I/O and
/// exposes no timeout of its own.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Connectivity liveness check
    async fn ping(&self) -> StateResult<()>;

    /// Atomically increments the integer at `key` by one, creating it at 1,
    /// and returns the post-increment value
    async fn incr(&self, key: &str) -> StateResult<u64>;

    /// Sets the time-to-live of `key`, independent of any other command.
    /// A missing key is a silent no-op, matching the store's behavior.
    async fn expire(&self, key: &str, ttl: Duration) -> StateResult<()>;

    /// Reads the string value at `key`, `None` when absent or expired
    async fn get(&self, key: &str) -> StateResult<Option<String>>;

    /// Unconditionally overwrites the string value at `key`, with no TTL
    async fn set(&self, key: &str, value: &str) -> StateResult<()>;

    /// Adds a member to the set at `key`, creating the set if needed.
    /// Adding an already-present member is a no-op.
    async fn sadd(&self, key: &str, member: &[u8]) -> StateResult<()>;

    /// Removes and returns an arbitrary member of the set at `key`,
    /// `None` when the set is empty or absent
    async fn spop(&self, key: &str) -> StateResult<Option<Vec<u8>>>;

    /// Cardinality of the set at `key`, 0 when absent
    async fn scard(&self, key: &str) -> StateResult<u64>;

    /// Enumerates keys matching a glob-style pattern
    async fn keys(&self, pattern: &str) -> StateResult<Vec<String>>;

    /// Deletes every listed key; missing keys are ignored
    async fn del(&self, keys: &[String]) -> StateResult<()>;
}
