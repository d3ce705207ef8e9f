//! Cache entry bookkeeping

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A resident cache entry
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    /// Reads since the entry was written; never decreases
    pub access_count: u64,
    /// Byte length of the payload's JSON form, measured at write time; 0 when
    /// the payload could not be serialized
    pub size_bytes: usize,
}

impl<V> CacheEntry<V> {
    pub fn new(key: String, value: V, size_bytes: usize, now: DateTime<Utc>) -> Self {
        Self {
            key,
            value,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            size_bytes,
        }
    }

    /// Record a read
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_accessed_at = now;
        self.access_count = self.access_count.saturating_add(1);
    }

    /// Seconds since the entry was written
    pub fn age_secs(&self, now: DateTime<Utc>) -> f64 {
        seconds_between(self.created_at, now)
    }

    /// Seconds since the entry was last read (or written)
    pub fn idle_secs(&self, now: DateTime<Utc>) -> f64 {
        seconds_between(self.last_accessed_at, now)
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age_secs(now) > ttl.as_secs_f64()
    }
}

fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_increments_and_restamps() {
        let start = Utc::now();
        let mut entry = CacheEntry::new("k".to_string(), 1u32, 1, start);
        assert_eq!(entry.access_count, 0);

        let later = start + chrono::Duration::seconds(5);
        entry.touch(later);
        assert_eq!(entry.access_count, 1);
        assert_eq!(entry.last_accessed_at, later);
        assert_eq!(entry.created_at, start);
    }

    #[test]
    fn test_expiry_is_measured_from_creation() {
        let start = Utc::now();
        let mut entry = CacheEntry::new("k".to_string(), (), 1, start);
        let ttl = Duration::from_secs(60);

        entry.touch(start + chrono::Duration::seconds(59));
        assert!(!entry.is_expired(ttl, start + chrono::Duration::seconds(60)));
        assert!(entry.is_expired(ttl, start + chrono::Duration::seconds(61)));
    }
}
