//! Key naming and namespace-wide clearing
//!
//! Every key Shiori stores is built as `<prefix>:<kind>:<discriminator>`,
//! where the prefix scopes one logical crawl task and the kind is a
//! single-letter discriminator from [`KeyKind`]. Keeping the kinds in an
//! explicit registry means the bulk clear iterates over every persisted
//! entity kind; a new kind of state cannot be added without also becoming
//! part of [`Namespace::clear_all`].

use crate::store::{KeyValueStore, StateResult};
use tracing::debug;

/// The registry of persisted entity kinds
///
/// Each variant owns one single-letter key discriminator. Adding a variant
/// here is the only way to introduce a new kind of persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Per-resource visit counter (`r`), one key per resource id
    Visit,
    /// Cookie blob (`c`), one key per host
    Cookie,
    /// Pending request set (`q`), one key per namespace
    Queue,
}

impl KeyKind {
    /// Every registered kind, in the order the bulk clear visits them
    pub const ALL: [KeyKind; 3] = [KeyKind::Visit, KeyKind::Cookie, KeyKind::Queue];

    /// The single-letter discriminator used in stored keys
    pub fn discriminator(self) -> char {
        match self {
            KeyKind::Visit => 'r',
            KeyKind::Cookie => 'c',
            KeyKind::Queue => 'q',
        }
    }

    /// Whether this kind stores exactly one key per namespace
    ///
    /// Singleton kinds are cleared by their exact key; the others are
    /// enumerated with a wildcard pattern.
    pub fn is_singleton(self) -> bool {
        matches!(self, KeyKind::Queue)
    }
}

/// Deterministic key construction for one crawl task's namespace
///
/// All builders are pure string formatting with no I/O and no failure mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    /// Creates a namespace with the given prefix
    ///
    /// The prefix is immutable afterwards; callers validate it up front
    /// (see `config::validation`).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the namespace prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the visit counter for a resource id
    pub fn visit_key(&self, resource_id: u64) -> String {
        format!(
            "{}:{}:{}",
            self.prefix,
            KeyKind::Visit.discriminator(),
            resource_id
        )
    }

    /// Key of the cookie blob for a host
    pub fn cookie_key(&self, host: &str) -> String {
        format!("{}:{}:{}", self.prefix, KeyKind::Cookie.discriminator(), host)
    }

    /// Key of the pending request set
    pub fn queue_key(&self) -> String {
        format!("{}:{}", self.prefix, KeyKind::Queue.discriminator())
    }

    /// Glob pattern matching every key of a non-singleton kind
    pub fn pattern(&self, kind: KeyKind) -> String {
        format!("{}:{}:*", self.prefix, kind.discriminator())
    }

    /// Deletes every key belonging to this namespace
    ///
    /// Enumerates each kind in the [`KeyKind::ALL`] registry: singleton
    /// kinds by their exact key, the rest by wildcard pattern, then issues
    /// one multi-key delete. A write landing between the enumeration and
    /// the delete survives; the backing store offers no cross-command
    /// transaction, and that race is accepted.
    pub async fn clear_all<S: KeyValueStore>(&self, store: &S) -> StateResult<()> {
        let mut doomed = Vec::new();
        for kind in KeyKind::ALL {
            if kind.is_singleton() {
                doomed.push(self.queue_key());
            } else {
                doomed.extend(store.keys(&self.pattern(kind)).await?);
            }
        }

        debug!(
            namespace = %self.prefix,
            keys = doomed.len(),
            "clearing namespace"
        );
        store.del(&doomed).await
    }
}
