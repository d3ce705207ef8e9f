//! Multi-factor recommendation scoring
//!
//! Scores one activity for one student in one class. The score combines five
//! factors with fixed weights:
//! - Skill level match (30%)
//! - Fitness level match (20%)
//! - Preference match (20%)
//! - Class requirements (20%)
//! - Recent performance (10%)
//!
//! Every factor lies in [0, 1], so the overall score does too. Missing inputs
//! degrade to a zero contribution for their factor; scoring never fails.

use crate::types::{
    ActivityCandidate, ClassContext, PerformanceRecord, PreferenceInput, ScoreBreakdown,
    StudentProfile,
};

/// Spread of the 1-5 level scale used to normalise level distances
const LEVEL_SPAN: f32 = 5.0;

/// Neutral score for classes that declare no requirements
const NEUTRAL_REQUIREMENT: f32 = 0.5;

/// Factor weights (sum to 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub skill_level: f32,
    pub fitness_level: f32,
    pub preference: f32,
    pub class_requirements: f32,
    pub recent_performance: f32,
}

impl ScoringWeights {
    pub const DEFAULT: ScoringWeights = ScoringWeights {
        skill_level: 0.30,
        fitness_level: 0.20,
        preference: 0.20,
        class_requirements: 0.20,
        recent_performance: 0.10,
    };

    /// Weighted sum of a breakdown, clamped to [0, 1]
    pub fn combine(&self, breakdown: &ScoreBreakdown) -> f32 {
        let score = breakdown.skill_level_match * self.skill_level
            + breakdown.fitness_level_match * self.fitness_level
            + breakdown.preference_match * self.preference
            + breakdown.class_requirements * self.class_requirements
            + breakdown.recent_performance * self.recent_performance;

        score.clamp(0.0, 1.0)
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything the scorer looks at for one candidate
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub student: &'a StudentProfile,
    pub activity: &'a ActivityCandidate,
    pub class: &'a ClassContext,
    pub recent_performance: &'a [PerformanceRecord],
    pub preferences: Option<&'a PreferenceInput>,
}

/// Score a candidate, returning the overall score and its breakdown
pub fn score_activity(input: &ScoringInput<'_>) -> (f32, ScoreBreakdown) {
    score_activity_with(input, &ScoringWeights::DEFAULT)
}

pub fn score_activity_with(
    input: &ScoringInput<'_>,
    weights: &ScoringWeights,
) -> (f32, ScoreBreakdown) {
    let breakdown = ScoreBreakdown {
        skill_level_match: level_match(input.student.skill_level, input.activity.skill_level),
        fitness_level_match: level_match(
            input.student.fitness_level,
            input.activity.fitness_level,
        ),
        preference_match: input
            .preferences
            .map(|prefs| preference_match(input.activity, prefs))
            .unwrap_or(0.0),
        class_requirements: class_requirements(input.activity, input.class),
        recent_performance: recent_performance(input.student, input.activity, input.recent_performance),
    };

    (weights.combine(&breakdown), breakdown)
}

/// `1 - |a - b| / 5`, or 0 when either level is missing
pub fn level_match(student: Option<u8>, activity: Option<u8>) -> f32 {
    match (student, activity) {
        (Some(s), Some(a)) => {
            let distance = (f32::from(s) - f32::from(a)).abs();
            (1.0 - distance / LEVEL_SPAN).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

/// Mean of the preference signals the caller actually gave
///
/// Type preference contributes 1.0 on a match and 0.0 otherwise; difficulty
/// preference contributes its level closeness. With neither, the factor is 0.
pub fn preference_match(activity: &ActivityCandidate, prefs: &PreferenceInput) -> f32 {
    let mut total = 0.0;
    let mut signals = 0u32;

    if let Some(types) = &prefs.activity_types {
        if !types.is_empty() {
            signals += 1;
            if types.contains(&activity.activity_type) {
                total += 1.0;
            }
        }
    }

    if let Some(difficulty) = prefs.difficulty {
        signals += 1;
        total += level_match(Some(difficulty), activity.difficulty_level);
    }

    if signals == 0 {
        return 0.0;
    }

    (total / signals as f32).clamp(0.0, 1.0)
}

/// 1.0 when the class requires this activity type, 0.0 when it requires
/// others, 0.5 when it requires nothing
pub fn class_requirements(activity: &ActivityCandidate, class: &ClassContext) -> f32 {
    if !class.has_requirements() {
        return NEUTRAL_REQUIREMENT;
    }

    let required = class
        .required_activity_types
        .as_ref()
        .is_some_and(|types| types.contains(&activity.activity_type));
    if required {
        1.0
    } else {
        0.0
    }
}

/// Mean score (0-100 scale) of this student's records on this activity, as a
/// fraction
pub fn recent_performance(
    student: &StudentProfile,
    activity: &ActivityCandidate,
    records: &[PerformanceRecord],
) -> f32 {
    let scores: Vec<f32> = records
        .iter()
        .filter(|r| r.student_id == student.id && r.activity_id == activity.id)
        .map(|r| r.score)
        .filter(|s| s.is_finite())
        .collect();

    if scores.is_empty() {
        return 0.0;
    }

    let mean = scores.iter().sum::<f32>() / scores.len() as f32;
    (mean / 100.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ActivityCategory, ActivityId, ActivityType, ClassId, EquipmentRequirement, StudentId,
    };
    use chrono::Utc;

    fn student(skill: Option<u8>, fitness: Option<u8>) -> StudentProfile {
        StudentProfile {
            id: StudentId::new(),
            name: "Ada".to_string(),
            skill_level: skill,
            fitness_level: fitness,
        }
    }

    fn activity(skill: Option<u8>, fitness: Option<u8>) -> ActivityCandidate {
        ActivityCandidate {
            id: ActivityId::new(),
            name: "Shuttle run".to_string(),
            activity_type: ActivityType::FitnessTraining,
            category: ActivityCategory::Cardio,
            difficulty_level: Some(3),
            skill_level: skill,
            fitness_level: fitness,
            equipment: EquipmentRequirement::Minimal,
            duration_minutes: Some(15),
        }
    }

    fn class(required: Option<Vec<ActivityType>>) -> ClassContext {
        ClassContext {
            id: ClassId::new(),
            name: "Year 9 PE".to_string(),
            focus_areas: None,
            required_activity_types: required.map(|v| v.into_iter().collect()),
        }
    }

    fn record(student: &StudentProfile, activity: &ActivityCandidate, score: f32) -> PerformanceRecord {
        PerformanceRecord {
            student_id: student.id,
            activity_id: activity.id,
            score,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_matching_skill_without_context_scores_forty_percent() {
        let s = student(Some(3), None);
        let a = activity(Some(3), None);
        let c = class(None);

        let (overall, breakdown) = score_activity(&ScoringInput {
            student: &s,
            activity: &a,
            class: &c,
            recent_performance: &[],
            preferences: None,
        });

        assert_eq!(breakdown.skill_level_match, 1.0);
        assert_eq!(breakdown.fitness_level_match, 0.0);
        assert_eq!(breakdown.preference_match, 0.0);
        assert_eq!(breakdown.class_requirements, 0.5);
        assert_eq!(breakdown.recent_performance, 0.0);
        assert!((overall - 0.40).abs() < 1e-6);
    }

    #[test]
    fn test_level_match_distance() {
        assert!((level_match(Some(1), Some(3)) - 0.6).abs() < 1e-6);
        assert!((level_match(Some(5), Some(1)) - 0.2).abs() < 1e-6);
        assert_eq!(level_match(None, Some(3)), 0.0);
        assert_eq!(level_match(Some(3), None), 0.0);
        // Out-of-scale levels are clamped rather than going negative
        assert_eq!(level_match(Some(0), Some(10)), 0.0);
    }

    #[test]
    fn test_preference_match_is_averaged_not_summed() {
        let a = activity(Some(3), Some(3));
        let prefs = PreferenceInput {
            activity_types: Some([ActivityType::FitnessTraining].into_iter().collect()),
            difficulty: Some(3),
            ..Default::default()
        };
        assert_eq!(preference_match(&a, &prefs), 1.0);

        let prefs = PreferenceInput {
            activity_types: Some([ActivityType::Game].into_iter().collect()),
            difficulty: Some(3),
            ..Default::default()
        };
        assert!((preference_match(&a, &prefs) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_preference_match_without_signals() {
        let a = activity(None, None);
        assert_eq!(preference_match(&a, &PreferenceInput::default()), 0.0);

        let only_duration = PreferenceInput {
            duration_minutes: Some(20),
            ..Default::default()
        };
        assert_eq!(preference_match(&a, &only_duration), 0.0);
    }

    #[test]
    fn test_class_requirements() {
        let a = activity(None, None);
        assert_eq!(class_requirements(&a, &class(None)), 0.5);
        assert_eq!(class_requirements(&a, &class(Some(vec![]))), 0.5);
        assert_eq!(
            class_requirements(&a, &class(Some(vec![ActivityType::FitnessTraining]))),
            1.0
        );
        assert_eq!(
            class_requirements(&a, &class(Some(vec![ActivityType::Game]))),
            0.0
        );
    }

    #[test]
    fn test_recent_performance_only_counts_matching_pair() {
        let s = student(None, None);
        let a = activity(None, None);
        let other = activity(None, None);

        let records = vec![
            record(&s, &a, 80.0),
            record(&s, &a, 60.0),
            record(&s, &other, 10.0),
        ];

        assert!((recent_performance(&s, &a, &records) - 0.7).abs() < 1e-6);
        assert_eq!(recent_performance(&s, &a, &[]), 0.0);
    }

    #[test]
    fn test_full_match_reaches_one() {
        let s = student(Some(4), Some(2));
        let a = activity(Some(4), Some(2));
        let c = class(Some(vec![ActivityType::FitnessTraining]));
        let prefs = PreferenceInput {
            activity_types: Some([ActivityType::FitnessTraining].into_iter().collect()),
            difficulty: Some(3),
            ..Default::default()
        };
        let records = vec![record(&s, &a, 100.0)];

        let (overall, _) = score_activity(&ScoringInput {
            student: &s,
            activity: &a,
            class: &c,
            recent_performance: &records,
            preferences: Some(&prefs),
        });

        assert!((overall - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ScoringWeights::DEFAULT;
        let sum = w.skill_level
            + w.fitness_level
            + w.preference
            + w.class_requirements
            + w.recent_performance;
        assert!((sum - 1.0).abs() < 1e-6);
    }
}
