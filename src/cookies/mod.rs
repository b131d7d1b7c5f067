//! Shared cookie jar keyed by host
//!
//! Cookie blobs are opaque strings: no parsing, no merging, wholesale
//! overwrite on every update. The store holds one blob per host with no
//! expiry; blobs survive until the namespace is cleared.
//!
//! Two method families are exposed. The `try_` variants return errors and
//! are the real implementation. The bare variants reproduce the legacy
//! host contract, which has no error channel: failures there are logged
//! and the call degrades to a safe default (no-op on write, empty string
//! on read). That adapter is the only place in the crate where an error is
//! discarded. A consequence callers must live with: `get_cookies` cannot
//! distinguish "no cookies ever set" from "read failed".

use crate::namespace::Namespace;
use crate::store::{KeyValueStore, StateResult};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Process-local reader/writer locks sharded by host
///
/// Serializes interleaved cookie reads and writes for the same host within
/// one process while letting distinct hosts proceed in parallel. Provides
/// no cross-process exclusion: concurrent writers in different processes
/// resolve as last-writer-wins at the store level.
#[derive(Debug)]
pub struct HostLocks {
    shards: Vec<RwLock<()>>,
}

impl HostLocks {
    /// Creates a lock set with the given number of shards
    ///
    /// One shard degenerates to a single coarse lock over every host.
    pub fn new(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| RwLock::new(())).collect(),
        }
    }

    /// The lock shard responsible for a host
    pub fn for_host(&self, host: &str) -> &RwLock<()> {
        let mut hasher = DefaultHasher::new();
        host.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }
}

/// Race-free (within one process) read/write of cookie blobs per host
#[derive(Debug, Clone)]
pub struct CookieStore<S> {
    store: S,
    namespace: Namespace,
    locks: Arc<HostLocks>,
}

impl<S: KeyValueStore> CookieStore<S> {
    /// Creates a cookie store over the given store handle
    ///
    /// The lock set is injected rather than created here so several
    /// components (or tests) can share one, and so callers choose the
    /// shard count.
    pub fn new(store: S, namespace: Namespace, locks: Arc<HostLocks>) -> Self {
        Self {
            store,
            namespace,
            locks,
        }
    }

    /// Overwrites the stored cookie blob for a host
    ///
    /// Takes the host's exclusive lock for the duration of the store
    /// write, so two same-process writers cannot interleave with a reader
    /// in between.
    pub async fn try_set_cookies(&self, host: &str, cookies: &str) -> StateResult<()> {
        let _guard = self.locks.for_host(host).write().await;
        self.store
            .set(&self.namespace.cookie_key(host), cookies)
            .await
    }

    /// Reads the stored cookie blob for a host, `None` when never set
    pub async fn try_get_cookies(&self, host: &str) -> StateResult<Option<String>> {
        let _guard = self.locks.for_host(host).read().await;
        self.store.get(&self.namespace.cookie_key(host)).await
    }

    /// Overwrites the cookie blob for a host, discarding errors
    ///
    /// Legacy host contract: no error channel. A store failure is logged
    /// and the write is lost.
    pub async fn set_cookies(&self, host: &str, cookies: &str) {
        if let Err(e) = self.try_set_cookies(host, cookies).await {
            warn!(host, "set_cookies store write failed: {}", e);
        }
    }

    /// Reads the cookie blob for a host, degrading to `""`
    ///
    /// Legacy host contract: no error channel. Both "never set" and "read
    /// failed" come back as the empty string; failures are logged.
    pub async fn get_cookies(&self, host: &str) -> String {
        match self.try_get_cookies(host).await {
            Ok(Some(cookies)) => cookies,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(host, "get_cookies store read failed: {}", e);
                String::new()
            }
        }
    }
}
