//! Cache metrics collection
//!
//! Counters are atomics so snapshots never take a lock. The event history is
//! a bounded FIFO: once full, the oldest event is dropped for each new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Why an entry left the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    /// Removed by a capacity eviction pass
    Capacity,
    /// Found past its TTL on read
    Expired,
    /// Removed by an explicit invalidation
    Invalidated,
}

/// Kind of recorded cache event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CacheEventKind {
    Hit,
    Miss,
    Evicted { reason: EvictionReason },
}

/// One entry of the rolling history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEvent {
    pub kind: CacheEventKind,
    pub key: String,
    pub at: DateTime<Utc>,
}

/// Point-in-time view of cache counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Puts that had to run a capacity eviction pass first
    pub eviction_runs: u64,
    pub size: usize,
    pub hit_rate: f64,
    pub miss_rate: f64,
}

/// Counters and event history shared by a cache store
#[derive(Debug)]
pub struct MetricsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    eviction_runs: AtomicU64,
    history: Mutex<VecDeque<CacheEvent>>,
    history_capacity: usize,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl MetricsCollector {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            eviction_runs: AtomicU64::new(0),
            history: Mutex::new(VecDeque::with_capacity(history_capacity.min(1024))),
            history_capacity,
        }
    }

    pub fn record_hit(&self, key: &str, at: DateTime<Utc>) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.push_event(CacheEventKind::Hit, key, at);
    }

    pub fn record_miss(&self, key: &str, at: DateTime<Utc>) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.push_event(CacheEventKind::Miss, key, at);
    }

    pub fn record_eviction(&self, key: &str, reason: EvictionReason, at: DateTime<Utc>) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        self.push_event(CacheEventKind::Evicted { reason }, key, at);
    }

    /// Log an explicit invalidation; it does not count as an eviction
    pub fn record_invalidation(&self, key: &str, at: DateTime<Utc>) {
        self.push_event(
            CacheEventKind::Evicted {
                reason: EvictionReason::Invalidated,
            },
            key,
            at,
        );
    }

    pub fn record_eviction_run(&self) {
        self.eviction_runs.fetch_add(1, Ordering::Relaxed);
    }

    fn push_event(&self, kind: CacheEventKind, key: &str, at: DateTime<Utc>) {
        if self.history_capacity == 0 {
            return;
        }

        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        while history.len() >= self.history_capacity {
            history.pop_front();
        }
        history.push_back(CacheEvent {
            kind,
            key: key.to_string(),
            at,
        });
    }

    /// Snapshot counters; rates are recomputed on every call
    pub fn snapshot(&self, size: usize) -> CacheMetrics {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        let (hit_rate, miss_rate) = if total == 0 {
            (0.0, 0.0)
        } else {
            (hits as f64 / total as f64, misses as f64 / total as f64)
        };

        CacheMetrics {
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            eviction_runs: self.eviction_runs.load(Ordering::Relaxed),
            size,
            hit_rate,
            miss_rate,
        }
    }

    /// Recorded events, oldest first
    pub fn history(&self) -> Vec<CacheEvent> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Zero all counters and drop the history
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.eviction_runs.store(0, Ordering::Relaxed);
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
