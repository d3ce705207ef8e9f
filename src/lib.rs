//! Stride - Physical-Education Activity Recommender
//!
//! Recommends PE activities to a student within a class and caches the
//! computed lists for reuse:
//! - Multi-factor scoring (skill, fitness, preferences, class requirements,
//!   recent performance)
//! - Filtering, ranking and category-balanced diversification
//! - Bounded in-memory cache with lazy TTL expiry and score-driven batch
//!   eviction
//! - Hit/miss/eviction metrics with a rolling event history
//!
//! # Architecture
//!
//! - **Types**: Core data structures (StudentProfile, ActivityCandidate, etc.)
//! - **Scoring**: Pure per-candidate scorer
//! - **Cache**: Result cache and its metrics collector
//! - **Storage**: Read-only persistence collaborator trait + in-memory backend
//! - **Recommend**: Orchestrator tying the above together
//!
//! # Example
//!
//! ```ignore
//! use stride_core::{
//!     CacheStore, InMemoryStorage, RecommendationEngine, RecommendationRequest, StrideConfig,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> stride_core::Result<()> {
//!     let config = StrideConfig::load(None)?;
//!     let storage = Arc::new(InMemoryStorage::from_json_file("dataset.json".as_ref())?);
//!     let cache = Arc::new(CacheStore::new(config.cache.clone()));
//!
//!     let engine = RecommendationEngine::new(storage, config.recommendation.clone())
//!         .with_cache(cache);
//!
//!     let results = engine
//!         .recommend(&RecommendationRequest::new(student_id, class_id).with_limit(3))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod recommend;
pub mod scoring;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheMetrics, CacheStore, MetricsCollector};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, EvictionWeights, RecommendationConfig, StrideConfig};
pub use error::{Result, StrideError};
pub use recommend::{
    RecommendationCache, RecommendationEngine, RecommendationFilters, RecommendationRequest,
};
pub use scoring::{score_activity, ScoringInput, ScoringWeights};
pub use storage::{Dataset, InMemoryStorage, PersistenceBackend};
pub use types::{
    ActivityCandidate, ActivityCategory, ActivityId, ActivityType, ClassContext, ClassId,
    EquipmentRequirement, PerformanceRecord, PreferenceInput, ScoreBreakdown,
    ScoredRecommendation, StudentId, StudentProfile,
};
