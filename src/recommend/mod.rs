//! Recommendation orchestration
//!
//! Turns a [`RecommendationRequest`] into a ranked list:
//! 1. Validate the request
//! 2. Serve from the result cache when possible (never for requests that
//!    exclude recent activities, whose answer moves with the clock and with
//!    every new performance record)
//! 3. Resolve student and class (an unknown reference yields an empty list)
//! 4. Score every activity candidate
//! 5. Filter: min score, then max duration, then recently performed
//! 6. Stable sort by score, descending
//! 7. Optionally keep one candidate per category (balanced mode)
//! 8. Truncate to the limit and populate the cache

pub mod request;

use crate::cache::CacheStore;
use crate::clock::{Clock, SystemClock};
use crate::config::RecommendationConfig;
use crate::error::{Result, StrideError};
use crate::scoring::{score_activity, ScoringInput};
use crate::storage::PersistenceBackend;
use crate::types::{
    ActivityCandidate, ActivityId, ClassContext, ClassId, PerformanceRecord, PreferenceInput,
    ScoredRecommendation, StudentId, StudentProfile,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use request::{RecommendationFilters, RecommendationRequest, CACHE_KEY_PREFIX};

/// Cache holding computed recommendation lists
pub type RecommendationCache = CacheStore<Vec<ScoredRecommendation>>;

/// Recommendation orchestrator
///
/// Construct once at startup and share by reference or `Arc`.
pub struct RecommendationEngine {
    storage: Arc<dyn PersistenceBackend>,
    cache: Option<Arc<RecommendationCache>>,
    config: RecommendationConfig,
    clock: Arc<dyn Clock>,
}

impl RecommendationEngine {
    /// Create an engine without a result cache
    pub fn new(storage: Arc<dyn PersistenceBackend>, config: RecommendationConfig) -> Self {
        Self {
            storage,
            cache: None,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_cache(mut self, cache: Arc<RecommendationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&Arc<RecommendationCache>> {
        self.cache.as_ref()
    }

    fn result_cache(&self, request: &RecommendationRequest) -> Option<&RecommendationCache> {
        if self.config.cache_results && !request.filters.exclude_recent {
            self.cache.as_deref()
        } else {
            None
        }
    }

    /// Ranked recommendations for a student in a class
    ///
    /// Malformed input is a `Validation` error. An unknown student or class
    /// is not an error here: the result is simply empty.
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<ScoredRecommendation>> {
        request.validate(&self.config)?;

        let cache_key = match self.result_cache(request) {
            Some(cache) => {
                let key = request.cache_key(&self.config)?;
                if let Some(cached) = cache.get(&key) {
                    debug!("Serving {} cached recommendations", cached.len());
                    return Ok(cached);
                }
                Some(key)
            }
            None => None,
        };

        let Some(student) = self.storage.find_student(request.student_id).await? else {
            warn!("Student {} not found, returning no recommendations", request.student_id);
            return Ok(Vec::new());
        };

        let Some(class) = self.storage.find_class(request.class_id).await? else {
            warn!("Class {} not found, returning no recommendations", request.class_id);
            return Ok(Vec::new());
        };

        let activities = self.storage.list_activities().await?;
        let history = self.recent_assessments(student.id).await?;

        let scored = score_candidates(
            &student,
            &class,
            activities,
            &history,
            request.preferences.as_ref(),
        );
        let candidate_count = scored.len();

        let recently_performed = if request.filters.exclude_recent {
            self.recently_performed(student.id).await?
        } else {
            HashSet::new()
        };

        let filtered = apply_filters(scored, &request.filters, &recently_performed);
        let mut ranked = rank(filtered);

        if request.balanced {
            ranked = diversify_by_category(ranked);
        }

        ranked.truncate(request.effective_limit(&self.config));

        info!(
            "Recommended {} of {} activities for student {} in class {}",
            ranked.len(),
            candidate_count,
            student.id,
            class.id
        );

        if let (Some(cache), Some(key)) = (self.result_cache(request), cache_key) {
            cache.put(key, ranked.clone());
        }

        Ok(ranked)
    }

    /// Score a single activity with its full breakdown
    ///
    /// Unlike [`recommend`](Self::recommend), unknown references are errors.
    pub async fn explain(
        &self,
        student_id: StudentId,
        class_id: ClassId,
        activity_id: ActivityId,
        preferences: Option<&PreferenceInput>,
    ) -> Result<ScoredRecommendation> {
        let student = self.student(student_id).await?;
        let class = self.class(class_id).await?;

        let activity = self
            .storage
            .find_activity(activity_id)
            .await?
            .ok_or_else(|| StrideError::ActivityNotFound(activity_id.to_string()))?;

        let history = self.recent_assessments(student.id).await?;

        let (score, breakdown) = score_activity(&ScoringInput {
            student: &student,
            activity: &activity,
            class: &class,
            recent_performance: &history,
            preferences,
        });

        Ok(ScoredRecommendation {
            activity,
            score,
            breakdown,
        })
    }

    /// Look up a student, failing when it does not exist
    pub async fn student(&self, id: StudentId) -> Result<StudentProfile> {
        self.storage
            .find_student(id)
            .await?
            .ok_or_else(|| StrideError::StudentNotFound(id.to_string()))
    }

    /// Look up a class, failing when it does not exist
    pub async fn class(&self, id: ClassId) -> Result<ClassContext> {
        self.storage
            .find_class(id)
            .await?
            .ok_or_else(|| StrideError::ClassNotFound(id.to_string()))
    }

    /// Drop every cached list for a student
    ///
    /// Call after recording new performance for that student.
    pub fn invalidate_student(&self, student_id: StudentId) -> usize {
        match &self.cache {
            Some(cache) => {
                cache.invalidate_prefix(&RecommendationRequest::student_key_prefix(student_id))
            }
            None => 0,
        }
    }

    /// Latest assessments feeding the recent-performance factor
    async fn recent_assessments(&self, student_id: StudentId) -> Result<Vec<PerformanceRecord>> {
        let mut records = self
            .storage
            .list_performance(student_id, None, None)
            .await?;
        records.truncate(self.config.performance_history);
        Ok(records)
    }

    /// Activities performed inside the trailing window
    async fn recently_performed(&self, student_id: StudentId) -> Result<HashSet<ActivityId>> {
        let window = chrono::Duration::from_std(self.config.recent_window)
            .map_err(|e| StrideError::Other(format!("Invalid recent window: {}", e)))?;
        let since = self.clock.now() - window;

        let records = self
            .storage
            .list_performance(student_id, None, Some(since))
            .await?;
        Ok(records.into_iter().map(|r| r.activity_id).collect())
    }
}

/// Score every candidate, preserving enumeration order
pub fn score_candidates(
    student: &StudentProfile,
    class: &ClassContext,
    activities: Vec<ActivityCandidate>,
    history: &[PerformanceRecord],
    preferences: Option<&PreferenceInput>,
) -> Vec<ScoredRecommendation> {
    activities
        .into_iter()
        .map(|activity| {
            let (score, breakdown) = score_activity(&ScoringInput {
                student,
                activity: &activity,
                class,
                recent_performance: history,
                preferences,
            });
            ScoredRecommendation {
                activity,
                score,
                breakdown,
            }
        })
        .collect()
}

/// Apply filters in order: min score, max duration, recently performed
///
/// An activity with no recorded duration never exceeds `max_duration`.
pub fn apply_filters(
    candidates: Vec<ScoredRecommendation>,
    filters: &RecommendationFilters,
    recently_performed: &HashSet<ActivityId>,
) -> Vec<ScoredRecommendation> {
    candidates
        .into_iter()
        .filter(|c| filters.min_score.map_or(true, |min| c.score >= min))
        .filter(|c| {
            match (filters.max_duration, c.activity.duration_minutes) {
                (Some(max), Some(duration)) => duration <= max,
                _ => true,
            }
        })
        .filter(|c| !filters.exclude_recent || !recently_performed.contains(&c.activity.id))
        .collect()
}

/// Sort by score, descending; equal scores keep enumeration order
pub fn rank(mut candidates: Vec<ScoredRecommendation>) -> Vec<ScoredRecommendation> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}

/// Keep the highest-scoring candidate of each category
///
/// Expects input already ranked; the output stays ranked.
pub fn diversify_by_category(ranked: Vec<ScoredRecommendation>) -> Vec<ScoredRecommendation> {
    let mut seen = HashSet::new();
    let diversified: Vec<ScoredRecommendation> = ranked
        .into_iter()
        .filter(|c| seen.insert(c.activity.category))
        .collect();
    rank(diversified)
}
