//! Bounded key/value store with lazy TTL expiry and score-driven eviction

use super::entry::CacheEntry;
use super::eviction::{eviction_target, rank_for_eviction};
use super::metrics::{CacheEvent, CacheMetrics, EvictionReason, MetricsCollector};
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Process-wide result cache
///
/// Safe to share across tasks behind an `Arc`. Every mutating operation,
/// including `get` (which re-stamps the entry), holds the write lock for its
/// whole read-modify-write, so size checks and eviction passes never race.
/// The resident count is mirrored in an atomic so metrics reads never wait
/// on the lock.
pub struct CacheStore<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    size: AtomicUsize,
    config: CacheConfig,
    metrics: Arc<MetricsCollector>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Serialize> CacheStore<V> {
    /// Create a store reading the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let metrics = Arc::new(MetricsCollector::new(config.history_capacity));
        Self {
            entries: RwLock::new(HashMap::new()),
            size: AtomicUsize::new(0),
            config,
            metrics,
            clock,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish the resident count; call with the write lock still held
    fn sync_size(&self, entries: &HashMap<String, CacheEntry<V>>) {
        self.size.store(entries.len(), Ordering::Release);
    }

    /// Look up a value
    ///
    /// A hit bumps the entry's access count and last-access time. An entry
    /// older than the TTL is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.write();

        let expired = match entries.get_mut(key) {
            None => {
                self.metrics.record_miss(key, now);
                debug!("Cache miss: {}", key);
                return None;
            }
            Some(entry) if entry.is_expired(self.config.ttl, now) => true,
            Some(entry) => {
                entry.touch(now);
                self.metrics.record_hit(key, now);
                debug!("Cache hit: {} (accesses: {})", key, entry.access_count);
                return Some(entry.value.clone());
            }
        };

        if expired {
            entries.remove(key);
            self.sync_size(&entries);
            self.metrics.record_eviction(key, EvictionReason::Expired, now);
            self.metrics.record_miss(key, now);
            debug!("Cache entry expired on read: {}", key);
        }

        None
    }

    /// Insert or overwrite a value
    ///
    /// A new key arriving at a full store first triggers a capacity eviction
    /// pass, which shrinks the store to `max_size * (1 - eviction_threshold)`.
    /// Overwriting a resident key never evicts, even at capacity, since it
    /// does not grow the store.
    ///
    /// A payload that fails to serialize is stored with an unknown (zero)
    /// size, which eviction treats as neutral.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let size_bytes = match serde_json::to_vec(&value) {
            Ok(bytes) => bytes.len(),
            Err(e) => {
                warn!("Could not measure cache payload for {}: {}", key, e);
                0
            }
        };
        let now = self.clock.now();

        let mut entries = self.write();

        if entries.len() >= self.config.max_size && !entries.contains_key(&key) {
            self.evict_for_capacity(&mut entries, now);
        }

        entries.insert(key.clone(), CacheEntry::new(key, value, size_bytes, now));
        self.sync_size(&entries);
    }

    fn evict_for_capacity(
        &self,
        entries: &mut HashMap<String, CacheEntry<V>>,
        now: DateTime<Utc>,
    ) {
        let target = eviction_target(self.config.max_size, self.config.eviction_threshold);
        let before = entries.len();

        let ranked = rank_for_eviction(
            entries,
            &self.config.eviction_weights,
            self.config.ttl,
            now,
        );

        for (key, score) in ranked {
            if entries.len() <= target {
                break;
            }
            entries.remove(&key);
            self.metrics
                .record_eviction(&key, EvictionReason::Capacity, now);
            debug!("Evicted {} (score: {:.3})", key, score);
        }

        self.metrics.record_eviction_run();
        info!(
            "Cache eviction pass: {} -> {} entries (max: {})",
            before,
            entries.len(),
            self.config.max_size
        );
    }

    /// Remove one entry, or everything when `key` is `None`
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, key: Option<&str>) -> usize {
        let now = self.clock.now();
        let mut entries = self.write();

        match key {
            Some(key) => match entries.remove(key) {
                Some(_) => {
                    self.sync_size(&entries);
                    self.metrics.record_invalidation(key, now);
                    debug!("Invalidated cache entry: {}", key);
                    1
                }
                None => 0,
            },
            None => {
                let removed = entries.len();
                for key in entries.keys() {
                    self.metrics.record_invalidation(key, now);
                }
                entries.clear();
                self.sync_size(&entries);
                info!("Cleared cache ({} entries)", removed);
                removed
            }
        }
    }

    /// Remove every entry whose key starts with `prefix`
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let now = self.clock.now();
        let mut entries = self.write();

        let keys: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();

        for key in &keys {
            entries.remove(key);
            self.metrics.record_invalidation(key, now);
        }
        self.sync_size(&entries);

        if !keys.is_empty() {
            debug!("Invalidated {} entries with prefix {}", keys.len(), prefix);
        }
        keys.len()
    }

    /// Current counters and rates
    ///
    /// Lock-free: reads atomics only, so it never waits on a writer.
    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.snapshot(self.len())
    }

    /// Recent access and eviction events, oldest first
    pub fn history(&self) -> Vec<CacheEvent> {
        self.metrics.history()
    }

    /// Whether a key is resident, without touching it or the metrics
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
