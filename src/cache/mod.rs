//! Adaptive in-memory result cache
//!
//! A bounded key/value store with:
//! - lazy TTL expiry (discovered on read, never swept)
//! - batch capacity eviction ranked by access frequency, recency and
//!   payload size
//! - hit/miss/eviction counters with a capped event history

pub mod entry;
pub mod eviction;
pub mod metrics;
pub mod store;

pub use entry::CacheEntry;
pub use metrics::{CacheEvent, CacheEventKind, CacheMetrics, EvictionReason, MetricsCollector};
pub use store::CacheStore;
