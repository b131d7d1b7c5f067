//! Visit counting with a sliding expiry window
//!
//! Each resource id owns one counter in the store. Recording a visit
//! increments the counter and resets its time-to-live, so a resource's
//! visit history ages out once it has been left alone for the configured
//! window. The ceiling is a caller-side configuration value compared
//! against the stored count; it is never persisted.

use crate::namespace::Namespace;
use crate::store::{KeyValueStore, StateError, StateResult};
use std::time::Duration;

/// Tracks per-resource visit counts against a shared ceiling
///
/// Resource ids are numeric fingerprints of normalized fetch targets,
/// supplied by the caller; this component attaches no meaning to them.
#[derive(Debug, Clone)]
pub struct VisitTracker<S> {
    store: S,
    namespace: Namespace,
    window: Duration,
    limit: u64,
}

impl<S: KeyValueStore> VisitTracker<S> {
    /// Creates a tracker over the given store handle
    ///
    /// # Arguments
    ///
    /// * `store` - Shared backing store handle
    /// * `namespace` - Key namespace for this crawl task
    /// * `window` - Sliding expiry window for visit counters
    /// * `limit` - Visits permitted within the window before
    ///   [`StateError::LimitReached`] is reported
    pub fn new(store: S, namespace: Namespace, window: Duration, limit: u64) -> Self {
        Self {
            store,
            namespace,
            window,
            limit,
        }
    }

    /// Records one visit to a resource
    ///
    /// Increments the counter and resets its expiry to the window as two
    /// store commands. Both are always attempted: if the increment fails
    /// its error is reported and the expiry outcome is irrelevant; if only
    /// the expiry fails, the distinct [`StateError::ExpiryRefresh`] variant
    /// tells the caller the count was recorded and only the TTL set needs
    /// retrying.
    pub async fn record_visit(&self, resource_id: u64) -> StateResult<()> {
        let key = self.namespace.visit_key(resource_id);
        let incremented = self.store.incr(&key).await;
        let expired = self.store.expire(&key, self.window).await;

        incremented?;
        if let Err(source) = expired {
            return Err(StateError::ExpiryRefresh {
                key,
                source: Box::new(source),
            });
        }
        Ok(())
    }

    /// Checks whether a resource is still within its visit allowance
    ///
    /// A missing counter reads as zero visits. The boundary value equal to
    /// the ceiling is still permitted; only a count strictly above it is a
    /// breach, reported as [`StateError::LimitReached`] so the signal
    /// cannot be dropped by ignoring a boolean.
    ///
    /// # Returns
    ///
    /// * `Ok(false)` - Within the allowance (count <= limit)
    /// * `Err(StateError::LimitReached)` - The ceiling has been exceeded
    /// * `Err(StateError::MalformedState)` - The stored counter is not an
    ///   integer; never coerced to zero
    pub async fn check_visited(&self, resource_id: u64) -> StateResult<bool> {
        let key = self.namespace.visit_key(resource_id);
        let raw = match self.store.get(&key).await? {
            Some(raw) => raw,
            None => return Ok(false),
        };

        let count: u64 = raw.parse().map_err(|_| StateError::MalformedState {
            key,
            value: raw.clone(),
        })?;

        if count <= self.limit {
            Ok(false)
        } else {
            Err(StateError::LimitReached {
                count,
                limit: self.limit,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn create_tracker(window: Duration, limit: u64) -> (VisitTracker<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        let tracker = VisitTracker::new(store.clone(), Namespace::new("crawl"), window, limit);
        (tracker, store)
    }

    /// Store double whose increment and expiry commands can be made to
    /// fail, for exercising the two-command error contract of
    /// `record_visit`
    #[derive(Clone)]
    struct FaultyStore {
        inner: MemoryStore,
        fail_incr: bool,
        fail_expire: bool,
    }

    impl FaultyStore {
        fn refused() -> StateError {
            StateError::Connectivity(redis::RedisError::from((
                redis::ErrorKind::Io,
                "connection refused",
            )))
        }
    }

    #[async_trait::async_trait]
    impl KeyValueStore for FaultyStore {
        async fn ping(&self) -> StateResult<()> {
            self.inner.ping().await
        }

        async fn incr(&self, key: &str) -> StateResult<u64> {
            if self.fail_incr {
                return Err(Self::refused());
            }
            self.inner.incr(key).await
        }

        async fn expire(&self, key: &str, ttl: Duration) -> StateResult<()> {
            if self.fail_expire {
                return Err(Self::refused());
            }
            self.inner.expire(key, ttl).await
        }

        async fn get(&self, key: &str) -> StateResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> StateResult<()> {
            self.inner.set(key, value).await
        }

        async fn sadd(&self, key: &str, member: &[u8]) -> StateResult<()> {
            self.inner.sadd(key, member).await
        }

        async fn spop(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
            self.inner.spop(key).await
        }

        async fn scard(&self, key: &str) -> StateResult<u64> {
            self.inner.scard(key).await
        }

        async fn keys(&self, pattern: &str) -> StateResult<Vec<String>> {
            self.inner.keys(pattern).await
        }

        async fn del(&self, keys: &[String]) -> StateResult<()> {
            self.inner.del(keys).await
        }
    }

    #[tokio::test]
    async fn test_never_recorded_is_not_visited() {
        let (tracker, _) = create_tracker(Duration::from_secs(10), 5);
        assert!(!tracker.check_visited(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_boundary_count_still_permitted() {
        let (tracker, _) = create_tracker(Duration::from_secs(10), 5);
        for _ in 0..5 {
            tracker.record_visit(42).await.unwrap();
        }
        assert!(!tracker.check_visited(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_limit_reached_above_ceiling() {
        let (tracker, _) = create_tracker(Duration::from_secs(10), 5);
        for _ in 0..6 {
            tracker.record_visit(42).await.unwrap();
        }
        let err = tracker.check_visited(42).await.unwrap_err();
        assert!(matches!(
            err,
            StateError::LimitReached { count: 6, limit: 5 }
        ));
    }

    #[tokio::test]
    async fn test_other_resources_unaffected() {
        let (tracker, _) = create_tracker(Duration::from_secs(10), 1);
        tracker.record_visit(1).await.unwrap();
        tracker.record_visit(1).await.unwrap();

        assert!(tracker.check_visited(1).await.is_err());
        assert!(!tracker.check_visited(2).await.unwrap());
    }

    #[tokio::test]
    async fn test_counter_resets_after_window() {
        let (tracker, _) = create_tracker(Duration::from_millis(40), 1);
        tracker.record_visit(42).await.unwrap();
        tracker.record_visit(42).await.unwrap();
        assert!(tracker.check_visited(42).await.is_err());

        tokio::time::sleep(Duration::from_millis(70)).await;
        assert!(!tracker.check_visited(42).await.unwrap());

        // The next visit starts the count over at 1.
        tracker.record_visit(42).await.unwrap();
        assert!(!tracker.check_visited(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_window_slides_on_each_visit() {
        let (tracker, store) = create_tracker(Duration::from_millis(60), 10);
        tracker.record_visit(42).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        tracker.record_visit(42).await.unwrap();

        // Past the original deadline but inside the refreshed one, so the
        // count kept accumulating instead of restarting.
        tokio::time::sleep(Duration::from_millis(40)).await;
        let key = Namespace::new("crawl").visit_key(42);
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_expiry_failure_still_records_the_count() {
        let store = FaultyStore {
            inner: MemoryStore::new(),
            fail_incr: false,
            fail_expire: true,
        };
        let tracker = VisitTracker::new(
            store.clone(),
            Namespace::new("crawl"),
            Duration::from_secs(10),
            5,
        );

        let err = tracker.record_visit(42).await.unwrap_err();
        match err {
            StateError::ExpiryRefresh { key, source } => {
                assert_eq!(key, "crawl:r:42");
                assert!(matches!(*source, StateError::Connectivity(_)));
            }
            other => panic!("expected ExpiryRefresh, got {:?}", other),
        }

        // The increment went through; only the TTL set needs retrying.
        assert_eq!(
            store.inner.get("crawl:r:42").await.unwrap().as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn test_increment_failure_reported_before_expiry_failure() {
        let store = FaultyStore {
            inner: MemoryStore::new(),
            fail_incr: true,
            fail_expire: true,
        };
        let tracker = VisitTracker::new(
            store.clone(),
            Namespace::new("crawl"),
            Duration::from_secs(10),
            5,
        );

        // Both commands fail; the increment failure wins, and nothing was
        // recorded.
        let err = tracker.record_visit(42).await.unwrap_err();
        assert!(matches!(err, StateError::Connectivity(_)));
        assert!(store.inner.get("crawl:r:42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_counter_is_not_coerced() {
        let (tracker, store) = create_tracker(Duration::from_secs(10), 5);
        let key = Namespace::new("crawl").visit_key(42);
        store.set(&key, "garbage").await.unwrap();

        let err = tracker.check_visited(42).await.unwrap_err();
        match err {
            StateError::MalformedState { key: k, value } => {
                assert_eq!(k, key);
                assert_eq!(value, "garbage");
            }
            other => panic!("expected MalformedState, got {:?}", other),
        }
    }
}
