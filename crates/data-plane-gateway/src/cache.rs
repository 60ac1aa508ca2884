//! Bounded, time-limited cache of SNI → resolved shard.
//!
//! Shard resolution must happen twice per TLS handshake: once in the
//! per-ClientHello callback to select ALPN protocols, and again after the
//! handshake to dial the shard's primary. The callback API cannot carry state
//! forward, so this cache bridges the two phases, and also coalesces nearby
//! handshakes for the same SNI. Entries hold transient routing state and are
//! never served once stale. Failed resolutions are not cached.
//!
//! The LRU bound means that more than MAX_SIZE concurrently-handshaking
//! distinct SNIs can evict entries between the two phases under heavy load.
//! That failure mode is load shedding via handshake failure.

use crate::resolve::ResolvedShard;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Maximum number of cached resolutions.
pub const MAX_SIZE: usize = 1024;
/// Age at which a cached resolution is considered stale.
pub const MAX_AGE: std::time::Duration = std::time::Duration::from_secs(30);

pub struct ResolutionCache {
    inner: Mutex<lru::LruCache<String, Arc<ResolvedShard>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(lru::LruCache::new(NonZeroUsize::new(MAX_SIZE).unwrap())),
        }
    }

    /// Fetch the live cached resolution for `sni`, if any.
    /// A stale entry is treated as a miss.
    pub fn get(&self, sni: &str) -> Option<Arc<ResolvedShard>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.get(sni) {
            Some(resolved) if resolved.fetched_at.elapsed() <= MAX_AGE => Some(resolved.clone()),
            _ => None,
        }
    }

    /// Insert or replace the resolution for `sni`.
    /// Concurrent resolutions of one SNI are idempotent: the later writer
    /// wins.
    pub fn put(&self, sni: String, resolved: Arc<ResolvedShard>) {
        self.inner.lock().unwrap().put(sni, resolved);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resolve::test::resolved_fixture;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_and_are_not_served() {
        let cache = ResolutionCache::new();
        cache.put("task1-6000.gw.example".to_string(), Arc::new(resolved_fixture()));

        assert!(cache.get("task1-6000.gw.example").is_some());

        tokio::time::advance(MAX_AGE / 2).await;
        assert!(cache.get("task1-6000.gw.example").is_some());

        tokio::time::advance(MAX_AGE).await;
        assert!(cache.get("task1-6000.gw.example").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_is_bounded() {
        let cache = ResolutionCache::new();

        for i in 0..(MAX_SIZE + 100) {
            cache.put(format!("task{i}-6000.gw.example"), Arc::new(resolved_fixture()));
        }
        assert_eq!(cache.len(), MAX_SIZE);

        // The least-recently-used entries were evicted.
        assert!(cache.get("task0-6000.gw.example").is_none());
        assert!(cache
            .get(&format!("task{}-6000.gw.example", MAX_SIZE + 99))
            .is_some());
    }
}
