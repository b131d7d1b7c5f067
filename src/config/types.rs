use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Shiori
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub tracker: TrackerConfig,
}

/// Backing store connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Redis server address as "host:port" (port defaults to 6379)
    pub address: String,

    /// Password for the Redis server, if any
    #[serde(default)]
    pub password: Option<String>,

    /// Logical Redis database number
    #[serde(default)]
    pub database: i64,

    /// Key prefix scoping this crawl task's state
    pub namespace: String,
}

/// Visit tracking and cookie jar configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Sliding expiry window for visit counters, in seconds.
    /// A counter not touched for this long ages out and the next
    /// visit starts the count over.
    #[serde(rename = "visit-window-seconds")]
    pub visit_window_seconds: u64,

    /// Maximum number of visits to a resource permitted within the
    /// window before further visits are reported as limit-exceeded
    #[serde(rename = "visit-limit")]
    pub visit_limit: u64,

    /// Number of shards in the process-local cookie lock
    #[serde(rename = "cookie-lock-shards", default = "default_cookie_lock_shards")]
    pub cookie_lock_shards: usize,
}

fn default_cookie_lock_shards() -> usize {
    16
}

impl TrackerConfig {
    /// Returns the visit window as a [`Duration`]
    pub fn visit_window(&self) -> Duration {
        Duration::from_secs(self.visit_window_seconds)
    }
}
