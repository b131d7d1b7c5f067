//! Backing key-value store implementations
//!
//! This module defines the narrow store interface the tracker consumes
//! ([`KeyValueStore`]) and its two implementations:
//! - [`RedisStore`], the production backend over a shared Redis server
//! - [`MemoryStore`], an in-process backend with the same expiry and set
//!   semantics, used by the test suites and for single-process runs

mod memory;
mod redis;
mod traits;

pub use memory::MemoryStore;
pub use self::redis::RedisStore;
pub use traits::{KeyValueStore, StateError, StateResult};
