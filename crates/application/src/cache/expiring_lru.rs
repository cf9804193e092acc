use lru::LruCache;
use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Size-bounded LRU map whose entries also expire after a per-entry TTL.
///
/// Expired entries are dropped lazily on lookup. Values are cloned out, so
/// `V` is expected to be cheap to clone (`Arc<_>`).
pub struct ExpiringLru<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, Entry<V>>>,
}

impl<K: Hash + Eq, V: Clone> ExpiringLru<K, V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_with_ttl(key).map(|(value, _)| value)
    }

    /// Fresh value together with its remaining lifetime.
    pub fn get_with_ttl<Q>(&self, key: &Q) -> Option<(V, Duration)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let mut entries = self.lock();

        let entry = entries.get(key)?;
        if entry.expires_at > now {
            return Some((entry.value.clone(), entry.expires_at - now));
        }

        entries.pop(key);
        None
    }

    /// Stores `value`, replacing any previous entry for `key`. Returns true
    /// when another entry had to be evicted to make room.
    pub fn insert(&self, key: K, value: V, ttl: Duration) -> bool {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };

        let mut entries = self.lock();
        let replacing = entries.contains(&key);
        let displaced = entries.push(key, entry);
        !replacing && displaced.is_some()
    }

    /// Number of stored entries, expired ones included until they are touched.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}
