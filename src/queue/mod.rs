//! Shared queue of pending fetch requests
//!
//! One Redis set per namespace holds serialized request payloads as opaque
//! bytes. The set gives lightweight de-duplication for free: byte-identical
//! payloads collapse into one retrievable entry. In exchange there is no
//! ordering guarantee of any kind; `get_request` returns an arbitrary
//! member. Every payload added is retrievable exactly once under normal
//! operation.

use crate::namespace::Namespace;
use crate::store::{KeyValueStore, StateError, StateResult};

/// Unordered, dedup-tolerant collection of pending requests
#[derive(Debug, Clone)]
pub struct RequestQueue<S> {
    store: S,
    namespace: Namespace,
}

impl<S: KeyValueStore> RequestQueue<S> {
    /// Creates a queue over the given store handle
    pub fn new(store: S, namespace: Namespace) -> Self {
        Self { store, namespace }
    }

    /// Inserts an opaque request payload
    pub async fn add_request(&self, payload: &[u8]) -> StateResult<()> {
        self.store.sadd(&self.namespace.queue_key(), payload).await
    }

    /// Removes and returns an arbitrary pending payload
    ///
    /// # Returns
    ///
    /// * `Ok(payload)` - Some previously added payload
    /// * `Err(StateError::EmptyQueue)` - Nothing left to pop; expected
    ///   exhaustion, not a failure
    pub async fn get_request(&self) -> StateResult<Vec<u8>> {
        self.store
            .spop(&self.namespace.queue_key())
            .await?
            .ok_or(StateError::EmptyQueue)
    }

    /// Current number of pending payloads
    pub async fn queue_size(&self) -> StateResult<u64> {
        self.store.scard(&self.namespace.queue_key()).await
    }
}
