//! Recommendation request, filters and input validation

use crate::config::RecommendationConfig;
use crate::error::{Result, StrideError};
use crate::types::{ActivityType, ClassId, EquipmentRequirement, PreferenceInput, StudentId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Prefix shared by every cached recommendation list
pub const CACHE_KEY_PREFIX: &str = "recommendations";

/// Post-scoring filters, applied in field order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationFilters {
    /// Drop candidates scoring below this (0-1)
    #[serde(default)]
    pub min_score: Option<f32>,

    /// Drop candidates longer than this many minutes
    #[serde(default)]
    pub max_duration: Option<u32>,

    /// Drop activities the student performed within the recent window
    #[serde(default)]
    pub exclude_recent: bool,
}

/// One call to the recommender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub student_id: StudentId,
    pub class_id: ClassId,
    #[serde(default)]
    pub preferences: Option<PreferenceInput>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub filters: RecommendationFilters,
    /// Keep only the best candidate per category
    #[serde(default)]
    pub balanced: bool,
}

impl RecommendationRequest {
    pub fn new(student_id: StudentId, class_id: ClassId) -> Self {
        Self {
            student_id,
            class_id,
            preferences: None,
            limit: None,
            filters: RecommendationFilters::default(),
            balanced: false,
        }
    }

    pub fn with_preferences(mut self, preferences: PreferenceInput) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_filters(mut self, filters: RecommendationFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn balanced(mut self) -> Self {
        self.balanced = true;
        self
    }

    /// Limit after applying the configured default
    pub fn effective_limit(&self, config: &RecommendationConfig) -> usize {
        self.limit.unwrap_or(config.default_limit)
    }

    /// Reject malformed limits, filters and preferences
    pub fn validate(&self, config: &RecommendationConfig) -> Result<()> {
        if let Some(limit) = self.limit {
            if limit == 0 || limit > config.max_limit {
                return Err(StrideError::Validation(format!(
                    "limit must be between 1 and {}, got {}",
                    config.max_limit, limit
                )));
            }
        }

        if let Some(min_score) = self.filters.min_score {
            if !min_score.is_finite() || !(0.0..=1.0).contains(&min_score) {
                return Err(StrideError::Validation(format!(
                    "min_score must be between 0 and 1, got {}",
                    min_score
                )));
            }
        }

        if self.filters.max_duration == Some(0) {
            return Err(StrideError::Validation(
                "max_duration must be a positive number of minutes".to_string(),
            ));
        }

        if let Some(prefs) = &self.preferences {
            if let Some(difficulty) = prefs.difficulty {
                if !(1..=5).contains(&difficulty) {
                    return Err(StrideError::Validation(format!(
                        "preferred difficulty must be between 1 and 5, got {}",
                        difficulty
                    )));
                }
            }

            if prefs.duration_minutes == Some(0) {
                return Err(StrideError::Validation(
                    "preferred duration must be a positive number of minutes".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Prefix under which all of a student's cached lists live
    pub fn student_key_prefix(student_id: StudentId) -> String {
        format!("{}:{}:", CACHE_KEY_PREFIX, student_id)
    }

    /// Deterministic cache key for this request
    ///
    /// Requests that differ only in set ordering, or in an explicit limit
    /// equal to the default, map to the same key.
    pub fn cache_key(&self, config: &RecommendationConfig) -> Result<String> {
        let canonical = CanonicalRequest {
            preferences: self.preferences.as_ref().map(CanonicalPreferences::from),
            limit: self.effective_limit(config),
            filters: &self.filters,
            balanced: self.balanced,
        };

        let digest = Sha256::digest(serde_json::to_vec(&canonical)?);
        Ok(format!(
            "{}{}:{:x}",
            Self::student_key_prefix(self.student_id),
            self.class_id,
            digest
        ))
    }
}

#[derive(Serialize)]
struct CanonicalRequest<'a> {
    preferences: Option<CanonicalPreferences>,
    limit: usize,
    filters: &'a RecommendationFilters,
    balanced: bool,
}

#[derive(Serialize)]
struct CanonicalPreferences {
    activity_types: Option<Vec<ActivityType>>,
    difficulty: Option<u8>,
    duration_minutes: Option<u32>,
    equipment: Option<Vec<EquipmentRequirement>>,
}

fn sorted<T: Ord + Copy>(set: &HashSet<T>) -> Vec<T> {
    let mut items: Vec<T> = set.iter().copied().collect();
    items.sort();
    items
}

impl From<&PreferenceInput> for CanonicalPreferences {
    fn from(prefs: &PreferenceInput) -> Self {
        Self {
            activity_types: prefs.activity_types.as_ref().map(sorted),
            difficulty: prefs.difficulty,
            duration_minutes: prefs.duration_minutes,
            equipment: prefs.equipment.as_ref().map(sorted),
        }
    }
}
