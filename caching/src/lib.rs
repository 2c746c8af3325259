//! Bounded LRU and TTL cache primitives.
//!
//! Every process-wide cache in Stack Sage (Card Cache, Rules Query Cache, Meta
//! Cache) is built on these two primitives, each guarded by a single mutex per
//! the locking discipline in spec §5: "caches are protected by a single mutex
//! each... policy is last-write-wins, LRU eviction by access time."

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;
use tokio::sync::Mutex;

/// A bounded, LRU-evicting cache safe under concurrent reader/writer access.
///
/// Capacity is fixed at construction; inserting into a full cache evicts
/// exactly one entry (the least-recently-used one) before inserting the new
/// entry, so cardinality never exceeds `capacity` (spec §8 cache monotonicity).
pub struct BoundedCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is non-zero");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up `key`, promoting it to most-recently-used on hit. Returns a
    /// clone so callers never hold the cache lock while using the value.
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.inner.lock().await;
        guard.get(key).cloned()
    }

    /// Insert or overwrite `key` (last-write-wins). Evicts the
    /// least-recently-used entry first if the cache is already at capacity.
    pub async fn insert(&self, key: K, value: V) {
        let mut guard = self.inner.lock().await;
        guard.put(key, value);
    }

    pub async fn contains(&self, key: &K) -> bool {
        let guard = self.inner.lock().await;
        guard.contains(key)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }
}

/// Outcome of a [`TtlCache::get`] lookup, distinguishing a fresh hit from a
/// stale-but-usable one (spec §3 Meta Cache: "entries older than 7d are still
/// returned but flagged stale").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TtlLookup<V> {
    Fresh(V),
    Stale(V),
    Miss,
}

/// A TTL-bounded cache with a two-tier staleness band: fresh for
/// `fresh_window`, usable-but-stale until `warn_window`, evicted beyond that
/// (spec §3 Meta Cache, §6 cache limits: "Meta TTL 24h/warn-7d").
pub struct TtlCache<K, V> {
    entries: Mutex<std::collections::HashMap<K, (V, DateTime<Utc>)>>,
    fresh_window: chrono::Duration,
    warn_window: chrono::Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(fresh_window: Duration, warn_window: Duration) -> Self {
        Self {
            entries: Mutex::new(std::collections::HashMap::new()),
            fresh_window: chrono::Duration::from_std(fresh_window)
                .expect("fresh window fits in chrono::Duration"),
            warn_window: chrono::Duration::from_std(warn_window)
                .expect("warn window fits in chrono::Duration"),
        }
    }

    /// 24h fresh / 7d warn, matching spec §6's cache limits table.
    pub fn with_default_bands() -> Self {
        Self::new(Duration::from_secs(24 * 3600), Duration::from_secs(7 * 24 * 3600))
    }

    pub async fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Utc::now()).await;
    }

    async fn insert_at(&self, key: K, value: V, now: DateTime<Utc>) {
        let mut guard = self.entries.lock().await;
        guard.insert(key, (value, now));
    }

    pub async fn get(&self, key: &K) -> TtlLookup<V> {
        self.get_at(key, Utc::now()).await
    }

    async fn get_at(&self, key: &K, now: DateTime<Utc>) -> TtlLookup<V> {
        let guard = self.entries.lock().await;
        let Some((value, inserted_at)) = guard.get(key) else {
            return TtlLookup::Miss;
        };
        let age = now - *inserted_at;
        if age <= self.fresh_window {
            TtlLookup::Fresh(value.clone())
        } else if age <= self.warn_window {
            TtlLookup::Stale(value.clone())
        } else {
            TtlLookup::Miss
        }
    }

    pub async fn remove(&self, key: &K) {
        self.entries.lock().await.remove(key);
    }
}
