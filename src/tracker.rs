//! The crawl-state tracker facade
//!
//! [`StateTracker`] bundles the visit tracker, cookie store, and request
//! queue over one shared store handle and one namespace, exposing the
//! storage contract a crawling engine calls into: record/check visits
//! around each fetch, set/get cookies around each HTTP exchange, and
//! push/pop pending requests. Every method is safe to call concurrently
//! and may block on network I/O; callers apply their own timeouts above
//! this layer.

use crate::config::{Config, TrackerConfig};
use crate::cookies::{CookieStore, HostLocks};
use crate::namespace::Namespace;
use crate::queue::RequestQueue;
use crate::store::{KeyValueStore, RedisStore, StateResult};
use crate::visits::VisitTracker;
use std::sync::Arc;
use tracing::info;

/// Shared crawl state for one namespace, backed by one store handle
#[derive(Debug, Clone)]
pub struct StateTracker<S> {
    store: S,
    namespace: Namespace,
    visits: VisitTracker<S>,
    cookies: CookieStore<S>,
    queue: RequestQueue<S>,
}

impl StateTracker<RedisStore> {
    /// Connects to Redis and builds a tracker from the configuration
    ///
    /// The connection is PINGed once during setup, so connectivity
    /// problems surface here rather than on the first crawl operation.
    pub async fn connect(config: &Config) -> crate::Result<Self> {
        let store = RedisStore::connect(&config.store).await?;
        let namespace = Namespace::new(config.store.namespace.clone());
        info!(
            "Tracking crawl state under namespace '{}'",
            namespace.prefix()
        );
        Ok(Self::with_store(store, namespace, &config.tracker))
    }
}

impl<S: KeyValueStore + Clone> StateTracker<S> {
    /// Builds a tracker over an already-constructed store handle
    ///
    /// Useful for injecting a [`crate::store::MemoryStore`] in tests or a
    /// pre-configured Redis handle shared with other subsystems.
    pub fn with_store(store: S, namespace: Namespace, config: &TrackerConfig) -> Self {
        let locks = Arc::new(HostLocks::new(config.cookie_lock_shards));
        Self {
            visits: VisitTracker::new(
                store.clone(),
                namespace.clone(),
                config.visit_window(),
                config.visit_limit,
            ),
            cookies: CookieStore::new(store.clone(), namespace.clone(), locks),
            queue: RequestQueue::new(store.clone(), namespace.clone()),
            store,
            namespace,
        }
    }

    /// The namespace this tracker operates in
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Connectivity liveness check against the backing store
    pub async fn ping(&self) -> StateResult<()> {
        self.store.ping().await
    }

    /// Deletes every key belonging to this tracker's namespace
    pub async fn clear(&self) -> StateResult<()> {
        self.namespace.clear_all(&self.store).await
    }

    /// Records one visit to a resource (see [`VisitTracker::record_visit`])
    pub async fn record_visit(&self, resource_id: u64) -> StateResult<()> {
        self.visits.record_visit(resource_id).await
    }

    /// Checks a resource's visit allowance (see [`VisitTracker::check_visited`])
    pub async fn check_visited(&self, resource_id: u64) -> StateResult<bool> {
        self.visits.check_visited(resource_id).await
    }

    /// Overwrites a host's cookie blob, discarding errors
    /// (see [`CookieStore::set_cookies`])
    pub async fn set_cookies(&self, host: &str, cookies: &str) {
        self.cookies.set_cookies(host, cookies).await
    }

    /// Reads a host's cookie blob, degrading to `""`
    /// (see [`CookieStore::get_cookies`])
    pub async fn get_cookies(&self, host: &str) -> String {
        self.cookies.get_cookies(host).await
    }

    /// Error-returning variant of [`Self::set_cookies`]
    pub async fn try_set_cookies(&self, host: &str, cookies: &str) -> StateResult<()> {
        self.cookies.try_set_cookies(host, cookies).await
    }

    /// Error-returning variant of [`Self::get_cookies`]
    pub async fn try_get_cookies(&self, host: &str) -> StateResult<Option<String>> {
        self.cookies.try_get_cookies(host).await
    }

    /// Queues a pending request payload (see [`RequestQueue::add_request`])
    pub async fn add_request(&self, payload: &[u8]) -> StateResult<()> {
        self.queue.add_request(payload).await
    }

    /// Pops an arbitrary pending request (see [`RequestQueue::get_request`])
    pub async fn get_request(&self) -> StateResult<Vec<u8>> {
        self.queue.get_request().await
    }

    /// Number of pending requests (see [`RequestQueue::queue_size`])
    pub async fn queue_size(&self) -> StateResult<u64> {
        self.queue.queue_size().await
    }
}
