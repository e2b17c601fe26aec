//! Bounded single-flight computation cache.

use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
};

use crate::{CacheError, CacheKey};

/// Observed cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a ready entry.
    pub hits: u64,
    /// Lookups that triggered a computation.
    pub misses: u64,
    /// Ready entries evicted by the capacity bound.
    pub evictions: u64,
}

enum Slot {
    /// A computation for this key is running on some caller's thread.
    InFlight,
    /// Completed result, shared read-only.
    Ready { value: Arc<dyn Any + Send + Sync>, last_used: u64 },
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, Slot>,
    tick: u64,
    stats: CacheStats,
}

/// Size-bounded, recency-ordered computation cache.
///
/// Reads are idempotent: identical keys return the cached result without
/// recomputation, a hit's only side effect being a recency update. When
/// the ready-entry count exceeds the capacity, the least recently used
/// entry is evicted. Concurrent callers of an uncached key follow a
/// single-flight discipline: one computes, the rest block and reuse the
/// result. Entries live until eviction or process exit; callers wanting
/// fresh data vary a parameter (an explicit as-of token) instead.
#[derive(Debug)]
pub struct ComputeCache {
    capacity: usize,
    state: Mutex<CacheState>,
    ready: Condvar,
}

impl std::fmt::Debug for CacheState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheState")
            .field("entries", &self.entries.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl ComputeCache {
    /// Create a cache holding at most `capacity` ready entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
            ready: Condvar::new(),
        }
    }

    /// Maximum number of ready entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of ready entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.values().filter(|s| matches!(s, Slot::Ready { .. })).count()
    }

    /// Check if no ready entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Activity counters since construction.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Look up `key`, computing and inserting on a miss.
    ///
    /// The computation runs on the calling thread with the cache unlocked.
    /// If another caller is already computing the same key, this call
    /// blocks until that flight lands and reuses its result. A failed
    /// computation clears the in-flight marker, propagates its error to
    /// the caller that ran it, and leaves other callers free to retry.
    ///
    /// # Errors
    /// Propagates the computation's error, or `CacheError::TypeMismatch`
    /// (via `E: From<CacheError>`) if the key holds a different type.
    pub fn get_or_compute<T, E, F>(&self, key: &CacheKey, compute: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        E: From<CacheError>,
        F: FnOnce() -> Result<T, E>,
    {
        let mut state = self.lock();
        loop {
            let ready = match state.entries.get(key) {
                Some(Slot::Ready { value, .. }) => Some(Arc::clone(value)),
                Some(Slot::InFlight) => None,
                None => break,
            };

            if let Some(value) = ready {
                state.tick += 1;
                let tick = state.tick;
                if let Some(Slot::Ready { last_used, .. }) = state.entries.get_mut(key) {
                    *last_used = tick;
                }
                state.stats.hits += 1;
                drop(state);
                return value
                    .downcast::<T>()
                    .map_err(|_| CacheError::TypeMismatch { key: key.to_string() }.into());
            }

            state = self.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
        }

        // Claim the flight, then compute with the lock released.
        state.entries.insert(key.clone(), Slot::InFlight);
        state.stats.misses += 1;
        drop(state);

        let mut guard = FlightGuard { cache: self, key, landed: false };
        let value = Arc::new(compute()?);
        guard.land(Arc::clone(&value) as Arc<dyn Any + Send + Sync>);
        Ok(value)
    }

    /// Drop every ready entry and in-flight marker.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        drop(state);
        self.ready.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn evict_over_capacity(&self, state: &mut CacheState) {
        loop {
            let ready_count =
                state.entries.values().filter(|s| matches!(s, Slot::Ready { .. })).count();
            if ready_count <= self.capacity {
                return;
            }

            let oldest = state
                .entries
                .iter()
                .filter_map(|(key, slot)| match slot {
                    Slot::Ready { last_used, .. } => Some((*last_used, key.clone())),
                    Slot::InFlight => None,
                })
                .min_by_key(|(last_used, _)| *last_used);

            if let Some((_, key)) = oldest {
                state.entries.remove(&key);
                state.stats.evictions += 1;
            } else {
                return;
            }
        }
    }
}

/// Clears the in-flight marker if the computation never lands, so an
/// abandoned or failed flight cannot wedge other callers.
struct FlightGuard<'a> {
    cache: &'a ComputeCache,
    key: &'a CacheKey,
    landed: bool,
}

impl FlightGuard<'_> {
    fn land(&mut self, value: Arc<dyn Any + Send + Sync>) {
        let mut state = self.cache.lock();
        state.tick += 1;
        let tick = state.tick;
        state.entries.insert(self.key.clone(), Slot::Ready { value, last_used: tick });
        self.cache.evict_over_capacity(&mut state);
        drop(state);
        self.landed = true;
        self.cache.ready.notify_all();
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.landed {
            return;
        }
        let mut state = self.cache.lock();
        if matches!(state.entries.get(self.key), Some(Slot::InFlight)) {
            state.entries.remove(self.key);
        }
        drop(state);
        self.cache.ready.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::Serialize;

    use super::*;
    use crate::Stage;

    #[derive(Serialize)]
    struct Params {
        label: String,
    }

    fn key(label: &str) -> CacheKey {
        CacheKey::new(Stage::Breakpoints, &Params { label: label.to_string() }).unwrap()
    }

    #[test]
    fn second_lookup_is_a_pure_hit() {
        let cache = ComputeCache::with_capacity(8);
        let calls = AtomicUsize::new(0);
        let key = key("median");

        for _ in 0..3 {
            let value: Arc<Vec<f64>> = cache
                .get_or_compute(&key, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, CacheError>(vec![1.0, 2.0])
                })
                .unwrap();
            assert_eq!(*value, vec![1.0, 2.0]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn lru_eviction_order() {
        let cache = ComputeCache::with_capacity(2);

        let a = key("a");
        let b = key("b");
        let c = key("c");

        let fill = |k: &CacheKey, v: u64| {
            cache.get_or_compute(k, || Ok::<_, CacheError>(v)).unwrap();
        };

        fill(&a, 1);
        fill(&b, 2);
        // Touch `a` so `b` becomes the least recently used.
        fill(&a, 1);
        fill(&c, 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);

        // `a` survives, `b` was evicted and recomputes.
        let calls = AtomicUsize::new(0);
        let _: Arc<u64> = cache
            .get_or_compute(&a, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CacheError>(1)
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let _: Arc<u64> = cache
            .get_or_compute(&b, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CacheError>(2)
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_flight_clears_marker() {
        let cache = ComputeCache::with_capacity(4);
        let key = key("flaky");

        let err: Result<Arc<u64>, CacheError> = cache.get_or_compute(&key, || {
            Err(CacheError::TypeMismatch { key: "synthetic".to_string() })
        });
        assert!(err.is_err());

        // The key is free again: the next caller computes successfully.
        let value: Arc<u64> = cache.get_or_compute(&key, || Ok::<_, CacheError>(7)).unwrap();
        assert_eq!(*value, 7);
    }

    #[test]
    fn type_mismatch_is_reported() {
        let cache = ComputeCache::with_capacity(4);
        let key = key("typed");

        let _: Arc<u64> = cache.get_or_compute(&key, || Ok::<_, CacheError>(7)).unwrap();
        let result: Result<Arc<String>, CacheError> =
            cache.get_or_compute(&key, || Ok::<_, CacheError>("seven".to_string()));
        assert!(matches!(result, Err(CacheError::TypeMismatch { .. })));
    }

    #[test]
    fn single_flight_under_contention() {
        let cache = Arc::new(ComputeCache::with_capacity(4));
        let calls = Arc::new(AtomicUsize::new(0));
        let key = Arc::new(key("contended"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let key = Arc::clone(&key);
                std::thread::spawn(move || {
                    let value: Arc<u64> = cache
                        .get_or_compute(&key, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Ok::<_, CacheError>(99)
                        })
                        .unwrap();
                    assert_eq!(*value, 99);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 7);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = ComputeCache::with_capacity(4);
        let _: Arc<u64> = cache.get_or_compute(&key("x"), || Ok::<_, CacheError>(1)).unwrap();
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
