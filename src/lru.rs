//! Fixed-capacity memoization cache with least-recently-used eviction.
//!
//! This is the baseline the splay tree is measured against: a bounded cache that forgets the
//! entry it touched longest ago once it is full. Recency tracking is delegated to
//! `lru::LruCache`; this wrapper adds the hit and miss counters the benchmarks report.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::ops::Add;

/// Hit and miss counters of an `LruCache<K, V>`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Returns the fraction of lookups that were hits, or `0.0` if there were none.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A cache holding at most `capacity` entries, evicting the least recently used one on overflow.
///
/// # Examples
///
/// ```
/// use splay_cache::lru::LruCache;
/// use std::num::NonZeroUsize;
///
/// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
/// cache.insert("a", 1);
/// cache.insert("b", 2);
/// assert_eq!(cache.get(&"a"), Some(&1));
///
/// // "b" is now the least recently used entry.
/// cache.insert("c", 3);
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.len(), 2);
/// ```
pub struct LruCache<K, V> {
    inner: ::lru::LruCache<K, V>,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash,
{
    /// Constructs a new, empty `LruCache<K, V>` holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        LruCache {
            inner: ::lru::LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Constructs a cache that never evicts.
    pub fn unbounded() -> Self {
        LruCache {
            inner: ::lru::LruCache::unbounded(),
            stats: CacheStats::default(),
        }
    }

    /// Returns a reference to the value cached for `key` and marks it as most recently used.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_cache::lru::LruCache;
    ///
    /// let mut cache = LruCache::unbounded();
    /// cache.insert(1, "one");
    /// assert_eq!(cache.get(&1), Some(&"one"));
    /// assert_eq!(cache.get(&2), None);
    /// assert_eq!(cache.stats().hits, 1);
    /// assert_eq!(cache.stats().misses, 1);
    /// ```
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let value = self.inner.get(key);
        if value.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        value
    }

    /// Inserts a key-value pair as the most recently used entry. If the key is already cached its
    /// value is replaced and the old value is returned. Otherwise, if the cache is full, the least
    /// recently used entry is evicted first.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.inner.put(key, value)
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the maximum number of entries the cache holds.
    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }

    /// Returns the hit and miss counters accumulated by `get`.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Removes every entry. The hit and miss counters are kept.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

/// Computes the `n`-th Fibonacci number, memoizing intermediate results in an LRU cache.
///
/// # Examples
///
/// ```
/// use splay_cache::lru::{self, LruCache};
///
/// let mut cache: LruCache<u64, u64> = LruCache::unbounded();
/// assert_eq!(lru::fibonacci(10, &mut cache), 55);
/// ```
pub fn fibonacci<V>(n: u64, cache: &mut LruCache<u64, V>) -> V
where
    V: Clone + Add<Output = V> + From<u8>,
{
    if let Some(value) = cache.get(&n).cloned() {
        return value;
    }
    let value = if n < 2 {
        V::from(n as u8)
    } else {
        fibonacci(n - 1, cache) + fibonacci(n - 2, cache)
    };
    cache.insert(n, value.clone());
    value
}

#[cfg(test)]
mod tests {
    use super::{fibonacci, CacheStats, LruCache};
    use std::num::NonZeroUsize;

    fn bounded<K: Eq + std::hash::Hash, V>(capacity: usize) -> LruCache<K, V> {
        LruCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    // Cached keys from most to least recently used.
    fn keys(cache: &LruCache<u32, u32>) -> Vec<u32> {
        cache.inner.iter().map(|(key, _)| *key).collect()
    }

    #[test]
    fn test_len_empty() {
        let cache: LruCache<u32, u32> = bounded(4);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 4);
    }

    #[test]
    fn test_insert_get() {
        let mut cache = bounded(4);
        assert_eq!(cache.insert(1, 10), None);
        assert_eq!(cache.insert(2, 20), None);
        assert_eq!(cache.get(&1), Some(&10));
        assert_eq!(cache.get(&3), None);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_insert_replace() {
        let mut cache = bounded(4);
        cache.insert(1, 10);
        cache.insert(2, 20);
        assert_eq!(cache.insert(1, 11), Some(10));
        assert_eq!(cache.len(), 2);
        assert_eq!(keys(&cache), vec![1, 2]);
    }

    #[test]
    fn test_eviction_order() {
        let mut cache = bounded(3);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(3, 3);
        cache.get(&1);
        cache.insert(4, 4);
        assert_eq!(keys(&cache), vec![4, 1, 3]);

        cache.insert(5, 5);
        assert_eq!(keys(&cache), vec![5, 4, 1]);
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), None);
    }

    #[test]
    fn test_clear_keeps_stats() {
        let mut cache = bounded(2);
        cache.insert(1, 1);
        cache.get(&1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        cache.insert(2, 2);
        assert_eq!(cache.get(&2), Some(&2));
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let mut cache = LruCache::unbounded();
        for key in 0..10_000u32 {
            cache.insert(key, key);
        }
        assert_eq!(cache.len(), 10_000);
        assert_eq!(cache.get(&0), Some(&0));
    }

    #[test]
    fn test_hit_ratio() {
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
        assert_eq!(CacheStats { hits: 3, misses: 1 }.hit_ratio(), 0.75);
    }

    #[test]
    fn test_fibonacci() {
        let mut cache: LruCache<u64, u64> = LruCache::unbounded();
        assert_eq!(fibonacci(10, &mut cache), 55);
        assert_eq!(cache.len(), 11);
        assert_eq!(fibonacci(90, &mut cache), 2_880_067_194_370_816_120);
    }

    #[test]
    fn test_fibonacci_small_capacity() {
        let mut cache: LruCache<u64, u64> = bounded(2);
        assert_eq!(fibonacci(20, &mut cache), 6_765);
        assert_eq!(cache.len(), 2);
    }
}
