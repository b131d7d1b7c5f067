//! Shiori: a shared crawl-state tracker
//!
//! This crate keeps the mutable state of a distributed web crawl in Redis so
//! that any number of worker processes can share it: per-resource visit
//! counters with a sliding expiry window, a cookie jar keyed by host, and an
//! unordered queue of pending fetch requests. All keys are scoped by a
//! namespace prefix so independent crawl tasks can share one Redis database.

pub mod config;
pub mod cookies;
pub mod namespace;
pub mod queue;
pub mod store;
pub mod tracker;
pub mod visits;

use thiserror::Error;

/// Main error type for Shiori operations
#[derive(Debug, Error)]
pub enum ShioriError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] store::StateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid store address: {0}")]
    InvalidAddress(String),
}

/// Result type alias for Shiori operations
pub type Result<T> = std::result::Result<T, ShioriError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use cookies::{CookieStore, HostLocks};
pub use namespace::{KeyKind, Namespace};
pub use queue::RequestQueue;
pub use store::{KeyValueStore, MemoryStore, RedisStore, StateError, StateResult};
pub use tracker::StateTracker;
pub use visits::VisitTracker;
