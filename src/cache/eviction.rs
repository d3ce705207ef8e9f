//! Capacity eviction scoring
//!
//! Each resident entry gets a usefulness score:
//!
//! `score = w_f * frequency + w_r * recency + w_s * size`
//!
//! - frequency: access count relative to the most-read entry
//! - recency: `1 - idle / ttl`, clamped to [0, 1]
//! - size: smallest resident payload divided by this payload, so larger
//!   payloads rank lower
//!
//! Entries already past their TTL score exactly 0. Lowest scores go first.

use super::entry::CacheEntry;
use crate::config::EvictionWeights;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

/// Number of entries a pass leaves behind
///
/// `floor(max_size * (1 - threshold))`, capped so the insert that follows
/// still fits. The epsilon absorbs float error such as `10 * (1 - 0.9)`.
pub fn eviction_target(max_size: usize, threshold: f64) -> usize {
    let target = (max_size as f64 * (1.0 - threshold) + 1e-9).floor();
    let target = if target.is_finite() && target > 0.0 {
        target as usize
    } else {
        0
    };
    target.min(max_size.saturating_sub(1))
}

/// Aggregates over the resident set that normalise individual scores
#[derive(Debug, Clone, Copy)]
struct Normalisers {
    max_access: u64,
    min_size: usize,
}

impl Normalisers {
    fn from_entries<'a, V: 'a>(entries: impl Iterator<Item = &'a CacheEntry<V>>) -> Self {
        let mut max_access = 0;
        let mut min_size = usize::MAX;
        for entry in entries {
            max_access = max_access.max(entry.access_count);
            // Zero means the payload size is unknown
            if entry.size_bytes > 0 {
                min_size = min_size.min(entry.size_bytes);
            }
        }
        Self {
            max_access,
            min_size,
        }
    }
}

fn entry_score<V>(
    entry: &CacheEntry<V>,
    norm: Normalisers,
    weights: &EvictionWeights,
    ttl: Duration,
    now: DateTime<Utc>,
) -> f64 {
    if entry.is_expired(ttl, now) {
        return 0.0;
    }

    let frequency = if norm.max_access == 0 {
        0.0
    } else {
        entry.access_count as f64 / norm.max_access as f64
    };

    let recency = (1.0 - entry.idle_secs(now) / ttl.as_secs_f64()).clamp(0.0, 1.0);

    let size = if entry.size_bytes == 0 {
        1.0
    } else {
        (norm.min_size as f64 / entry.size_bytes as f64).clamp(0.0, 1.0)
    };

    weights.frequency * frequency + weights.recency * recency + weights.size * size
}

/// Resident keys ordered least useful first, with their scores
///
/// Ties go to the entry idle the longest, then to the smaller key.
pub fn rank_for_eviction<V>(
    entries: &HashMap<String, CacheEntry<V>>,
    weights: &EvictionWeights,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Vec<(String, f64)> {
    let norm = Normalisers::from_entries(entries.values());

    let mut ranked: Vec<(&CacheEntry<V>, f64)> = entries
        .values()
        .map(|entry| (entry, entry_score(entry, norm, weights, ttl, now)))
        .collect();

    ranked.sort_by(|(a, a_score), (b, b_score)| {
        a_score
            .partial_cmp(b_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.last_accessed_at.cmp(&b.last_accessed_at))
            .then_with(|| a.key.cmp(&b.key))
    });

    ranked
        .into_iter()
        .map(|(entry, score)| (entry.key.clone(), score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries_at(now: DateTime<Utc>, specs: &[(&str, u64, i64, usize)]) -> HashMap<String, CacheEntry<()>> {
        specs
            .iter()
            .map(|(key, accesses, idle_secs, size)| {
                let mut entry = CacheEntry::new(
                    key.to_string(),
                    (),
                    *size,
                    now - chrono::Duration::seconds(*idle_secs),
                );
                entry.access_count = *accesses;
                (key.to_string(), entry)
            })
            .collect()
    }

    #[test]
    fn test_eviction_target() {
        assert_eq!(eviction_target(10, 0.9), 1);
        assert_eq!(eviction_target(1000, 0.9), 100);
        assert_eq!(eviction_target(10, 0.0), 9);
        assert_eq!(eviction_target(1, 0.9), 0);
        assert_eq!(eviction_target(3, 0.5), 1);
        assert_eq!(eviction_target(10, 0.85), 1);
    }

    #[test]
    fn test_rarely_read_entries_rank_first() {
        let now = Utc::now();
        let entries = entries_at(now, &[("hot", 10, 0, 1), ("cold", 0, 0, 1), ("warm", 5, 0, 1)]);

        let ranked = rank_for_eviction(&entries, &EvictionWeights::default(), Duration::from_secs(3600), now);
        let order: Vec<&str> = ranked.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(order, vec!["cold", "warm", "hot"]);
    }

    #[test]
    fn test_idle_entries_rank_before_fresh_ones() {
        let now = Utc::now();
        let entries = entries_at(now, &[("fresh", 1, 0, 1), ("idle", 1, 1800, 1)]);

        let ranked = rank_for_eviction(&entries, &EvictionWeights::default(), Duration::from_secs(3600), now);
        assert_eq!(ranked[0].0, "idle");
        assert!((ranked[0].1 - (0.4 + 0.3 * 0.5 + 0.3)).abs() < 1e-9);
        assert!((ranked[1].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_expired_entries_score_zero() {
        let now = Utc::now();
        let entries = entries_at(now, &[("stale", 50, 7200, 1), ("valid", 0, 3000, 1)]);

        let ranked = rank_for_eviction(&entries, &EvictionWeights::default(), Duration::from_secs(3600), now);
        assert_eq!(ranked[0], ("stale".to_string(), 0.0));
        assert!(ranked[1].1 > 0.0);
    }

    #[test]
    fn test_larger_payloads_rank_lower() {
        let now = Utc::now();
        let entries = entries_at(now, &[("big", 1, 0, 400), ("small", 1, 0, 100)]);

        let ranked = rank_for_eviction(&entries, &EvictionWeights::default(), Duration::from_secs(3600), now);
        assert_eq!(ranked[0].0, "big");
        assert!((ranked[0].1 - (0.4 + 0.3 + 0.3 * 0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_size_leaves_other_size_scores_intact() {
        let now = Utc::now();
        let entries = entries_at(now, &[("unknown", 1, 0, 0), ("big", 1, 0, 400), ("small", 1, 0, 100)]);

        let ranked = rank_for_eviction(&entries, &EvictionWeights::default(), Duration::from_secs(3600), now);
        let scores: HashMap<&str, f64> = ranked.iter().map(|(k, s)| (k.as_str(), *s)).collect();
        assert!((scores["small"] - 1.0).abs() < 1e-9);
        assert!((scores["big"] - (0.4 + 0.3 + 0.3 * 0.25)).abs() < 1e-9);
        assert!((scores["unknown"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_break_by_key() {
        let now = Utc::now();
        let entries = entries_at(now, &[("b", 0, 0, 1), ("a", 0, 0, 1), ("c", 0, 0, 1)]);

        let ranked = rank_for_eviction(&entries, &EvictionWeights::default(), Duration::from_secs(3600), now);
        let order: Vec<&str> = ranked.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
