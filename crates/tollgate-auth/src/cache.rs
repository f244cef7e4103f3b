//! Verification-result cache.
//!
//! Maps a stored hash string to the fingerprint of the plaintext that
//! last verified against it. Keying by the hash itself means a changed
//! stored hash naturally misses the cache; there is no invalidation path
//! to get wrong. Entries expire lazily on read, with a [`cleanup_expired`]
//! sweep for long-idle keys.
//!
//! The cache is the only shared mutable state on the verification path.
//! It has an explicit constructor and is passed to consumers; there is no
//! process-global instance.
//!
//! [`cleanup_expired`]: PasswordCache::cleanup_expired

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of entries currently in the cache.
    pub size: usize,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries evicted due to TTL expiration.
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct CachedFingerprint {
    fingerprint: String,
    expires_at: Instant,
}

/// TTL cache from stored hash string to plaintext fingerprint.
pub struct PasswordCache {
    entries: DashMap<String, CachedFingerprint>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl PasswordCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Fingerprint cached for a stored hash, if present and unexpired.
    pub fn get(&self, hash: &str) -> Option<String> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(hash) {
            if entry.expires_at > now {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.fingerprint.clone());
            }
            // Entry expired, remove it
            drop(entry);
            self.entries.remove(hash);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Cache a fingerprint for a stored hash with a per-entry TTL.
    pub fn set(&self, hash: String, fingerprint: String, ttl: Duration) {
        self.entries.insert(
            hash,
            CachedFingerprint {
                fingerprint,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Remove expired entries. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            if entry.expires_at <= now {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        }

        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

impl Default for PasswordCache {
    fn default() -> Self {
        Self::new()
    }
}
