//! Configuration for the recommender and its result cache
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `STRIDE__<SECTION>__<FIELD>` environment variables
//! (e.g. `STRIDE__CACHE__MAX_SIZE=500`).

use crate::error::{Result, StrideError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const ENV_PREFIX: &str = "STRIDE";
const ENV_SEPARATOR: &str = "__";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrideConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub recommendation: RecommendationConfig,
}

/// Cache store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of resident entries
    pub max_size: usize,

    /// Entry lifetime measured from creation (in seconds)
    #[serde(with = "serde_duration")]
    pub ttl: Duration,

    /// Fraction of capacity to evict down *to*: a pass leaves
    /// `max_size * (1 - eviction_threshold)` entries
    pub eviction_threshold: f64,

    /// Number of access/eviction events kept in the metrics history
    pub history_capacity: usize,

    pub eviction_weights: EvictionWeights,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl: Duration::from_secs(3600),
            eviction_threshold: 0.9,
            history_capacity: 1000,
            eviction_weights: EvictionWeights::default(),
        }
    }
}

/// Weights of the eviction score components (sum to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvictionWeights {
    pub frequency: f64,
    pub recency: f64,
    pub size: f64,
}

impl Default for EvictionWeights {
    fn default() -> Self {
        Self {
            frequency: 0.4,
            recency: 0.3,
            size: 0.3,
        }
    }
}

/// Recommendation orchestration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Result count when the caller gives no limit
    pub default_limit: usize,

    /// Largest limit a caller may request
    pub max_limit: usize,

    /// Trailing window for `exclude_recent` (in seconds)
    #[serde(with = "serde_duration")]
    pub recent_window: Duration,

    /// Number of latest assessments feeding the recent-performance factor
    pub performance_history: usize,

    /// Store computed lists in the result cache
    pub cache_results: bool,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_limit: 50,
            recent_window: Duration::from_secs(7 * 24 * 3600), // 7 days
            performance_history: 5,
            cache_results: true,
        }
    }
}

// Durations are (de)serialized as whole seconds
mod serde_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

fn invalid(message: String) -> StrideError {
    StrideError::Config(config::ConfigError::Message(message))
}

impl StrideConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: StrideConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer defaults, an optional TOML file and `STRIDE__*` environment
    /// variables into one validated configuration
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let config: StrideConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.validate_cache()?;
        self.validate_recommendation()?;
        Ok(())
    }

    fn validate_cache(&self) -> Result<()> {
        let cache = &self.cache;

        if cache.max_size == 0 {
            return Err(invalid("cache: max_size must be at least 1".to_string()));
        }

        if cache.ttl.is_zero() {
            return Err(invalid("cache: ttl must be at least 1 second".to_string()));
        }

        if !(0.0..1.0).contains(&cache.eviction_threshold) {
            return Err(invalid(format!(
                "cache: eviction_threshold must be in [0, 1), got {}",
                cache.eviction_threshold
            )));
        }

        let w = cache.eviction_weights;
        if w.frequency < 0.0 || w.recency < 0.0 || w.size < 0.0 {
            return Err(invalid(
                "cache: eviction weights must be non-negative".to_string(),
            ));
        }

        let sum = w.frequency + w.recency + w.size;
        if (sum - 1.0).abs() > 0.001 {
            return Err(invalid(format!(
                "cache: eviction weights must sum to 1.0, got {:.3}",
                sum
            )));
        }

        Ok(())
    }

    fn validate_recommendation(&self) -> Result<()> {
        let rec = &self.recommendation;

        if rec.default_limit == 0 || rec.default_limit > rec.max_limit {
            return Err(invalid(format!(
                "recommendation: default_limit must be between 1 and max_limit ({})",
                rec.max_limit
            )));
        }

        if rec.performance_history == 0 {
            return Err(invalid(
                "recommendation: performance_history must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| StrideError::Other(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
