//! HotCache: thread-safe bounded LRU cache

use std::hash::Hash;

use parking_lot::Mutex;

use crate::error::Result;
use crate::lru::LruCache;
use crate::stats::CacheStats;

/// Bounded LRU cache safe to share across threads.
///
/// One mutex guards the index and the recency list as a unit, so no
/// caller can ever observe them out of step. Both `put` and `get` take
/// the lock exclusively — a `get` rewrites recency order, so there are
/// no pure readers. Operations from different threads serialize in lock
/// acquisition order and each appears atomic to every other caller.
///
/// Share between threads as `Arc<HotCache<K, V>>`.
pub struct HotCache<K, V> {
    /// Index and recency list, guarded as one unit
    inner: Mutex<LruCache<K, V>>,

    /// Operation counters, readable without the lock
    stats: CacheStats,

    /// Maximum number of entries, fixed at construction
    capacity: usize,
}

impl<K, V> HotCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, must be greater than 0
    ///
    /// # Returns
    /// * `Result<HotCache>` - The cache, or `Error::ZeroCapacity` for a
    ///   zero capacity, or `Error::OutOfMemory` when the capacity is too
    ///   large to reserve space for up front
    pub fn new(capacity: usize) -> Result<Self> {
        let inner = LruCache::new(capacity)?;

        Ok(Self {
            inner: Mutex::new(inner),
            stats: CacheStats::new(),
            capacity,
        })
    }

    /// Insert a new entry, evicting the least recently used entry if the
    /// cache is full.
    ///
    /// Insert-only: a key already present fails with `Error::KeyExists`
    /// and the cache is left untouched. At most one entry is evicted per
    /// call, always the current tail of the recency list.
    ///
    /// # Arguments
    /// * `key` - Key to insert under
    /// * `value` - Value to store; retrievable via `get` after return
    pub fn put(&self, key: K, value: V) -> Result<()> {
        let evicted = {
            let mut inner = self.inner.lock();
            inner.insert(key, value)?
        };

        self.stats.record_insert();
        if evicted.is_some() {
            self.stats.record_eviction();
        }

        Ok(())
    }

    /// Look up a key, marking its entry as most recently used.
    ///
    /// Returns a copy of the stored value. `None` means the key is not
    /// cached — a normal outcome, not an error. A hit never changes the
    /// entry count and never evicts.
    pub fn get(&self, key: &K) -> Option<V> {
        let value = {
            let mut inner = self.inner.lock();
            inner.get(key).cloned()
        };

        match value {
            Some(v) => {
                self.stats.record_hit();
                Some(v)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Current number of entries, read under the same lock as mutations
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Operation counters
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_new_rejects_zero_capacity() {
        let result = HotCache::<u32, u32>::new(0);
        assert!(matches!(result, Err(Error::ZeroCapacity)));
    }

    #[test]
    fn test_new_accepts_minimal_capacity() {
        let cache = HotCache::new(1).unwrap();
        cache.put(1u32, "a").unwrap();
        assert_eq!(cache.get(&1), Some("a"));
    }

    #[test]
    fn test_put_get_round_trip() {
        let cache = HotCache::new(10).unwrap();

        cache.put("k".to_string(), 42).unwrap();

        assert_eq!(cache.get(&"k".to_string()), Some(42));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_absent_value_is_storable() {
        // A None value is a legal entry, distinct from "key not found"
        let cache = HotCache::new(4).unwrap();

        cache.put(1u32, None::<String>).unwrap();

        assert_eq!(cache.get(&1), Some(None));
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn test_get_missing_key() {
        let cache = HotCache::<u32, u32>::new(4).unwrap();

        assert_eq!(cache.get(&7), None);
        assert_eq!(cache.stats().misses(), 1);
    }

    #[test]
    fn test_duplicate_put_rejected() {
        let cache = HotCache::new(4).unwrap();

        cache.put(1u32, "a").unwrap();
        let result = cache.put(1u32, "b");

        assert!(matches!(result, Err(Error::KeyExists)));
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_size_accounting() {
        let cache = HotCache::new(5).unwrap();

        for i in 0..3u32 {
            cache.put(i, i).unwrap();
        }
        assert_eq!(cache.len(), 3);

        for i in 3..20u32 {
            cache.put(i, i).unwrap();
        }
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.capacity(), 5);
    }

    #[test]
    fn test_pure_insertion_evicts_fifo() {
        let cache = HotCache::new(10).unwrap();

        for i in 0..15 {
            cache.put(format!("key{}", i), format!("value{}", i)).unwrap();
        }

        for i in 0..5 {
            assert_eq!(cache.get(&format!("key{}", i)), None);
        }
        for i in 5..15 {
            assert_eq!(
                cache.get(&format!("key{}", i)),
                Some(format!("value{}", i))
            );
        }
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.stats().evictions(), 5);
    }

    #[test]
    fn test_promotion_defers_eviction() {
        let cache = HotCache::new(10).unwrap();

        for i in 0..10u32 {
            cache.put(i, i).unwrap();
        }
        for i in 0..5u32 {
            cache.get(&i);
        }
        cache.put(101u32, 101).unwrap();

        // 5 was the least recently touched key
        assert_eq!(cache.get(&5), None);
        for i in (0..5).chain(6..10) {
            assert_eq!(cache.get(&i), Some(i));
        }
        assert_eq!(cache.get(&101), Some(101));
    }

    #[test]
    fn test_hot_key_survives_churn() {
        let cache = HotCache::new(10).unwrap();

        cache.put("hot".to_string(), 0u32).unwrap();
        for i in 0..100u32 {
            cache.put(format!("cold{}", i), i).unwrap();
            assert_eq!(cache.get(&"hot".to_string()), Some(0));
        }
    }

    #[test]
    fn test_stats_track_operations() {
        let cache = HotCache::new(2).unwrap();

        cache.put(1u32, "a").unwrap();
        cache.put(2u32, "b").unwrap();
        cache.put(3u32, "c").unwrap();
        cache.get(&3);
        cache.get(&1);

        let snap = cache.stats().snapshot();
        assert_eq!(snap.inserts, 3);
        assert_eq!(snap.evictions, 1);
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 1);
    }

    #[test]
    fn test_concurrent_access_stays_bounded() {
        let threads = 8;
        let iters = 1000;
        let cache = Arc::new(HotCache::new(64).unwrap());
        let barrier = Arc::new(Barrier::new(threads));
        let mut handles = Vec::new();

        for t in 0..threads {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                for i in 0..iters {
                    let key = (t * iters + i) % 256;
                    match cache.put(key, (t, i)) {
                        Ok(()) | Err(Error::KeyExists) => {}
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                    cache.get(&key);
                    assert!(cache.len() <= cache.capacity());
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= cache.capacity());
        assert!(!cache.is_empty());
    }
}
