//! Result cache with content-hash keys and single-flight computation.
//!
//! Keys are `CacheKey`s (indicator config hash + signal content hash), so a
//! result is reused only when both the data and the parameters match. Each
//! key owns a `OnceLock`: when several threads ask for the same key at once,
//! exactly one of them runs the algorithm and the rest block on the cell and
//! receive the same value.

use crate::fingerprint::CacheKey;
use crate::indicators::IndicatorOutput;
use crate::signal::DataError;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// What the cache stores per key. Errors are deterministic too, so they are
/// memoized alongside successful outputs.
pub type CachedResult = Result<IndicatorOutput, DataError>;

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// In-memory, thread-safe indicator result cache.
#[derive(Debug, Default)]
pub struct IndicatorCache {
    entries: DashMap<CacheKey, Arc<OnceLock<CachedResult>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl IndicatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `key`, running `compute` only if no
    /// caller has produced it yet.
    pub fn get_or_compute<F>(&self, key: &CacheKey, compute: F) -> CachedResult
    where
        F: FnOnce() -> CachedResult,
    {
        // The shard lock is held only while fetching the cell, never while
        // computing, so unrelated keys proceed in parallel.
        let cell = Arc::clone(&self.entries.entry(key.clone()).or_default());

        let mut computed_here = false;
        let result = cell.get_or_init(|| {
            computed_here = true;
            compute()
        });

        if computed_here {
            self.misses.fetch_add(1, Ordering::Relaxed);
            log::debug!("indicator cache miss {key}");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("indicator cache hit {key}");
        }

        result.clone()
    }

    /// Retrieves a completed result without computing anything.
    pub fn get(&self, key: &CacheKey) -> Option<CachedResult> {
        self.entries
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of keys with a stored result.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every stored result. Counters are kept.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{ConfigHash, SignalHash};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    fn key(config: &str, signal: &str) -> CacheKey {
        CacheKey {
            config: ConfigHash(config.to_string()),
            signal: SignalHash(signal.to_string()),
        }
    }

    fn output(value: f64) -> CachedResult {
        Ok(IndicatorOutput {
            value,
            diagnostics: vec![],
        })
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let cache = IndicatorCache::new();
        let k = key("c1", "s1");
        assert!(!cache.contains(&k));

        let first = cache.get_or_compute(&k, || output(1.0));
        let second = cache.get_or_compute(&k, || output(99.0));

        assert_eq!(first, output(1.0));
        assert_eq!(second, output(1.0));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_distinguishes_keys() {
        let cache = IndicatorCache::new();
        let _ = cache.get_or_compute(&key("c1", "s1"), || output(1.0));
        let _ = cache.get_or_compute(&key("c1", "s2"), || output(2.0));
        let _ = cache.get_or_compute(&key("c2", "s1"), || output(3.0));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&key("c1", "s2")), Some(output(2.0)));
    }

    #[test]
    fn test_cache_memoizes_errors() {
        let cache = IndicatorCache::new();
        let k = key("c", "s");
        let err = cache.get_or_compute(&k, || Err(DataError::Empty));
        assert_eq!(err, Err(DataError::Empty));
        assert_eq!(cache.get_or_compute(&k, || output(1.0)), Err(DataError::Empty));
    }

    #[test]
    fn test_cache_clear() {
        let cache = IndicatorCache::new();
        for i in 0..5 {
            let _ = cache.get_or_compute(&key("c", &i.to_string()), || output(i as f64));
        }
        assert_eq!(cache.len(), 5);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_single_flight_under_contention() {
        let cache = IndicatorCache::new();
        let runs = AtomicUsize::new(0);
        let threads = 8;
        let barrier = Barrier::new(threads);
        let k = key("slow", "signal");

        let results: Vec<CachedResult> = thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache.get_or_compute(&k, || {
                            runs.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            output(42.0)
                        })
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| *r == output(42.0)));
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, (threads - 1) as u64);
    }
}
