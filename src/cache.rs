use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clock::Clock;

/// A value together with the instant it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<V> {
    /// Stored value
    pub value: V,
    /// When the value was inserted or last overwritten
    pub created_at: DateTime<Utc>,
}

/// An in-memory key-value store whose entries expire after a fixed TTL
///
/// Expiry is measured against an injected [`Clock`]. An entry is expired
/// once `now - created_at` is strictly greater than the TTL; expired
/// entries are never returned and are evicted on read or by [`sweep`].
///
/// [`sweep`]: TtlStore::sweep
pub struct TtlStore<V> {
    store: Arc<RwLock<HashMap<String, Entry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send + Sync + 'static> TtlStore<V> {
    /// Creates an empty store
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Retention window
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, entry: &Entry<V>, now: DateTime<Utc>) -> bool {
        now - entry.created_at > self.ttl
    }

    /// Returns the live entry for `key`, evicting it if it has expired
    pub async fn get(&self, key: &str) -> Option<Entry<V>> {
        let now = self.clock.now();
        {
            let store = self.store.read().await;
            match store.get(key) {
                None => return None,
                Some(entry) if !self.is_expired(entry, now) => return Some(entry.clone()),
                Some(_) => {}
            }
        }

        let mut store = self.store.write().await;
        // another writer may have refreshed the entry in between
        if let Some(entry) = store.get(key) {
            if !self.is_expired(entry, now) {
                return Some(entry.clone());
            }
            store.remove(key);
        }
        None
    }

    /// Inserts or overwrites `key`, stamping it with the current time
    pub async fn insert(&self, key: &str, value: V) {
        let entry = Entry {
            value,
            created_at: self.clock.now(),
        };
        let mut store = self.store.write().await;
        store.insert(key.to_string(), entry);
    }

    /// Removes an entry, returning whether it existed
    pub async fn remove(&self, key: &str) -> bool {
        let mut store = self.store.write().await;
        store.remove(key).is_some()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        let store = self.store.read().await;
        store.values().filter(|entry| !self.is_expired(entry, now)).count()
    }

    /// Whether the store holds no live entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes expired entries and returns how many were removed
    pub async fn sweep(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut store = self.store.write().await;
        let before_len = store.len();
        store.retain(|_, entry| now - entry.created_at <= ttl);
        before_len - store.len()
    }
}
