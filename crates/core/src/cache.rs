//! Time-to-live keyed store backed by `moka`.
//!
//! Entries expire `ttl` after they were last set. The cache has no
//! capacity, so nothing is ever evicted for size; expiry is the only way
//! out apart from explicit removal.
//!
//! Every [`TtlCache::clear`] bumps a generation counter. A reader that
//! loads a value from the source of truth while a `clear` happens stores
//! it with [`TtlCache::set_if_current`], which refuses to keep a value read
//! before the `clear`.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

/// Opaque marker of the cache state a value was loaded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Clone)]
pub struct TtlCache<K, V> {
    inner: Cache<K, V>,
    generation: Arc<AtomicU64>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().time_to_live(ttl).build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The stored value, if present and not expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).await
    }

    /// Store `value` under `key`, replacing any previous entry and
    /// restarting its TTL.
    pub async fn set(&self, key: K, value: V) {
        self.inner.insert(key, value).await;
    }

    /// Current generation. Take it before reading the value to be cached.
    pub fn generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::SeqCst))
    }

    /// Store `value` only if no `clear` happened since `seen` was taken.
    /// Returns whether the value was kept.
    pub async fn set_if_current(&self, key: K, value: V, seen: Generation) -> bool
    where
        K: Clone,
    {
        if self.generation() != seen {
            return false;
        }
        self.inner.insert(key.clone(), value).await;
        // A clear that raced the insert must not be undone by it.
        if self.generation() != seen {
            self.inner.invalidate(&key).await;
            return false;
        }
        true
    }

    /// Expiry-aware presence check.
    pub async fn has(&self, key: &K) -> bool {
        self.get(key).await.is_some()
    }

    pub async fn remove(&self, key: &K) -> Option<V> {
        self.inner.remove(key).await
    }

    /// Drop every entry and start a new generation.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate_all();
    }

    /// Number of live entries.
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
