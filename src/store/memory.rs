//! In-process implementation of the store interface
//!
//! [`MemoryStore`] mirrors the Redis semantics the tracker relies on:
//! sliding per-key expiry (INCR preserves the deadline, EXPIRE resets it),
//! set add/pop/cardinality, and glob-pattern key enumeration. The test
//! suites run against it, and a single-process crawler can use it to avoid
//! standing up a Redis server.

use crate::store::{KeyValueStore, StateError, StateResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    Set(HashSet<Vec<u8>>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-memory key-value store with Redis-like expiry and set semantics
///
/// Clones share the same underlying map, matching the way every tracker
/// component holds a clone of one shared store handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn wrong_type(key: &str) -> StateError {
        StateError::MalformedState {
            key: key.to_string(),
            value: "value has the wrong type for this operation".to_string(),
        }
    }
}

/// Removes the entry if its deadline has passed, so expiry is observed
/// lazily on the next access, like Redis does from a client's viewpoint.
fn live_entry<'a>(
    entries: &'a mut HashMap<String, Entry>,
    key: &str,
    now: Instant,
) -> Option<&'a mut Entry> {
    if entries.get(key).is_some_and(|e| e.expired(now)) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

/// Glob-style pattern match supporting `*` (any run) and `?` (any one char)
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            // Try matching the star against nothing first; remember where
            // to resume if that fails.
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = backtrack {
            p = star_p + 1;
            t = star_t + 1;
            backtrack = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn ping(&self) -> StateResult<()> {
        Ok(())
    }

    async fn incr(&self, key: &str) -> StateResult<u64> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        match live_entry(&mut entries, key, now) {
            Some(entry) => match &mut entry.value {
                Value::Scalar(raw) => {
                    let count: u64 = raw.parse().map_err(|_| StateError::MalformedState {
                        key: key.to_string(),
                        value: raw.clone(),
                    })?;
                    let count = count + 1;
                    *raw = count.to_string();
                    // The deadline is untouched; only an explicit expire
                    // call slides it.
                    Ok(count)
                }
                Value::Set(_) => Err(Self::wrong_type(key)),
            },
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Scalar("1".to_string()),
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StateResult<()> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        if let Some(entry) = live_entry(&mut entries, key, now) {
            entry.expires_at = Some(now + ttl);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> StateResult<Option<String>> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        match live_entry(&mut entries, key, now) {
            Some(entry) => match &entry.value {
                Value::Scalar(raw) => Ok(Some(raw.clone())),
                Value::Set(_) => Err(Self::wrong_type(key)),
            },
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StateResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Scalar(value.to_string()),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn sadd(&self, key: &str, member: &[u8]) -> StateResult<()> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        match live_entry(&mut entries, key, now) {
            Some(entry) => match &mut entry.value {
                Value::Set(members) => {
                    members.insert(member.to_vec());
                    Ok(())
                }
                Value::Scalar(_) => Err(Self::wrong_type(key)),
            },
            None => {
                let mut members = HashSet::new();
                members.insert(member.to_vec());
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Set(members),
                        expires_at: None,
                    },
                );
                Ok(())
            }
        }
    }

    async fn spop(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        let popped = match live_entry(&mut entries, key, now) {
            Some(entry) => match &mut entry.value {
                Value::Set(members) => {
                    let member = members.iter().next().cloned();
                    if let Some(member) = &member {
                        members.remove(member);
                    }
                    member
                }
                Value::Scalar(_) => return Err(Self::wrong_type(key)),
            },
            None => None,
        };

        // Redis deletes a set when its last member is popped.
        let emptied = matches!(
            entries.get(key),
            Some(Entry { value: Value::Set(members), .. }) if members.is_empty()
        );
        if emptied {
            entries.remove(key);
        }

        Ok(popped)
    }

    async fn scard(&self, key: &str) -> StateResult<u64> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        match live_entry(&mut entries, key, now) {
            Some(entry) => match &entry.value {
                Value::Set(members) => Ok(members.len() as u64),
                Value::Scalar(_) => Err(Self::wrong_type(key)),
            },
            None => Ok(0),
        }
    }

    async fn keys(&self, pattern: &str) -> StateResult<Vec<String>> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        entries.retain(|_, entry| !entry.expired(now));
        Ok(entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect())
    }

    async fn del(&self, keys: &[String]) -> StateResult<()> {
        let mut entries = self.entries.lock().unwrap();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}
