//! In-Memory TTL Cache Module
//!
//! Memoizes country / currency API responses so repeated lookups do not hit
//! the remote services again.
//!
//! Features:
//! - Generic over key and value
//! - Absolute per-entry deadline (`expires_at = set time + ttl`)
//! - Lazy eviction: an expired entry is removed by the `get` that finds it
//! - Explicit invalidation via `expire`
//! - Thread-safe with DashMap
//!
//! There is no background sweeper: a stale entry that is never read again
//! stays in memory until `expire` is called or the process exits.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{DEFAULT_CACHE_TTL_MINUTES, MAX_CACHE_TTL_SECS};

/// Cache entry with its absolute deadline
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Strictly past the deadline; an entry due exactly `now` is still live
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    pub fn remaining_ttl(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Key-value store with time-based expiration
#[derive(Clone)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    store: Arc<DashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + std::fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_CACHE_TTL_MINUTES * 60))
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + std::fmt::Debug,
    V: Clone,
{
    /// TTLs above `MAX_CACHE_TTL_SECS` are clamped so deadlines stay representable
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl: ttl.min(Duration::from_secs(MAX_CACHE_TTL_SECS)),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or overwrite; the deadline restarts from now
    pub fn set(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        debug!("💾 CACHE SET: {:?} (TTL: {}s)", key, self.ttl.as_secs());
        self.store.insert(key, entry);
    }

    /// Stored value, `CacheMiss` if absent, `CacheExpired` if past its deadline.
    ///
    /// The expired entry is deleted, so every later `get` misses too.
    pub fn get(&self, key: &K) -> AppResult<V> {
        let now = Instant::now();

        let expired = match self.store.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "✅ CACHE HIT: {:?} ({}s remaining)",
                    key,
                    entry.remaining_ttl().as_secs()
                );
                return Ok(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        if expired {
            // A concurrent `set` may have refreshed the key in between
            self.store.remove_if(key, |_, entry| entry.is_expired_at(now));
            debug!("📭 CACHE MISS (expired): {:?}", key);
            Err(AppError::cache_expired())
        } else {
            debug!("📭 CACHE MISS: {:?}", key);
            Err(AppError::cache_miss())
        }
    }

    /// Drop the key; no-op when absent
    pub fn expire(&self, key: &K) {
        if self.store.remove(key).is_some() {
            info!("🗑️ CACHE EXPIRE: {:?}", key);
        }
    }

    /// Entries currently held, stale ones included
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

/// Hit/miss counters for the shutdown summary
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    #[test]
    fn test_get_never_set_misses() {
        let cache: TtlCache<String, u32> = TtlCache::default();
        let err = cache.get(&"argentina".to_string()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CacheMiss);
        assert!(err.is_cache_miss());
    }

    #[test]
    fn test_set_then_get() {
        let cache = TtlCache::default();
        cache.set("ar", 42u32);
        assert_eq!(cache.get(&"ar").unwrap(), 42);
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let cache = TtlCache::with_ttl(Duration::MAX);
        assert_eq!(cache.ttl(), Duration::from_secs(MAX_CACHE_TTL_SECS));
        cache.set("ar", 7u32);
        assert_eq!(cache.get(&"ar").unwrap(), 7);
    }

    #[test]
    fn test_set_overwrites() {
        let cache = TtlCache::default();
        cache.set("ar", 1u32);
        cache.set("ar", 2u32);
        assert_eq!(cache.get(&"ar").unwrap(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expire_then_get_misses() {
        let cache = TtlCache::default();
        cache.set("ar", 1u32);
        cache.expire(&"ar");
        assert!(cache.get(&"ar").unwrap_err().is_cache_miss());

        // idempotent
        cache.expire(&"ar");
        cache.expire(&"never-set");
    }

    #[test]
    fn test_expire_then_set_round_trip() {
        let cache = TtlCache::default();
        cache.set("k", "v1".to_string());
        cache.expire(&"k");
        cache.set("k", "v2".to_string());
        assert_eq!(cache.get(&"k").unwrap(), "v2");
    }

    #[test]
    fn test_elapsed_ttl_deletes_entry() {
        let cache = TtlCache::with_ttl(Duration::from_millis(10));
        cache.set("ar", 1u32);
        std::thread::sleep(Duration::from_millis(40));

        let err = cache.get(&"ar").unwrap_err();
        assert_eq!(err.code, ErrorCode::CacheExpired);
        assert_eq!(cache.len(), 0, "expired entry must be evicted, not hidden");

        let err = cache.get(&"ar").unwrap_err();
        assert_eq!(err.code, ErrorCode::CacheMiss);
    }

    #[test]
    fn test_stale_entry_kept_until_read() {
        let cache = TtlCache::with_ttl(Duration::from_millis(5));
        cache.set("ar", 1u32);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_deadline_boundary_is_live() {
        let now = Instant::now();
        let entry = CacheEntry { value: (), expires_at: now };
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + Duration::from_nanos(1)));
    }

    #[test]
    fn test_cache_stats() {
        let cache = TtlCache::default();
        cache.set("ar", 1u32);
        let _ = cache.get(&"ar"); // HIT
        let _ = cache.get(&"br"); // MISS

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.ttl_secs, DEFAULT_CACHE_TTL_MINUTES * 60);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache: TtlCache<u32, u32> = TtlCache::default();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.set(t * 1000 + i, i);
                        assert_eq!(cache.get(&(t * 1000 + i)).unwrap(), i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 800);
    }
}
