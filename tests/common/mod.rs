//! Common test utilities and helpers

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use stride_core::{
    ActivityCandidate, ActivityCategory, ActivityId, ActivityType, CacheConfig, CacheStore,
    ClassContext, ClassId, EquipmentRequirement, InMemoryStorage, ManualClock,
    PerformanceRecord, RecommendationCache, RecommendationConfig, RecommendationEngine,
    StudentId, StudentProfile,
};

pub fn student(skill: Option<u8>, fitness: Option<u8>) -> StudentProfile {
    StudentProfile {
        id: StudentId::new(),
        name: "Test Student".to_string(),
        skill_level: skill,
        fitness_level: fitness,
    }
}

pub fn class(required: &[ActivityType]) -> ClassContext {
    ClassContext {
        id: ClassId::new(),
        name: "Test Class".to_string(),
        focus_areas: None,
        required_activity_types: if required.is_empty() {
            None
        } else {
            Some(required.iter().copied().collect())
        },
    }
}

pub fn activity(
    name: &str,
    activity_type: ActivityType,
    category: ActivityCategory,
    skill: u8,
    duration: u32,
) -> ActivityCandidate {
    ActivityCandidate {
        id: ActivityId::new(),
        name: name.to_string(),
        activity_type,
        category,
        difficulty_level: Some(skill),
        skill_level: Some(skill),
        fitness_level: Some(skill),
        equipment: EquipmentRequirement::Minimal,
        duration_minutes: Some(duration),
    }
}

pub fn record(
    student: &StudentProfile,
    activity: &ActivityCandidate,
    score: f32,
    at: DateTime<Utc>,
) -> PerformanceRecord {
    PerformanceRecord {
        student_id: student.id,
        activity_id: activity.id,
        score,
        recorded_at: at,
    }
}

/// A populated storage plus the handles tests poke at
pub struct Fixture {
    pub storage: Arc<InMemoryStorage>,
    pub clock: Arc<ManualClock>,
    pub student: StudentProfile,
    pub class: ClassContext,
    pub activities: Vec<ActivityCandidate>,
}

impl Fixture {
    /// Student at skill/fitness 3 in a class requiring games, with eight
    /// activities spread over four categories
    pub async fn new() -> Self {
        let storage = Arc::new(InMemoryStorage::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));

        let student = student(Some(3), Some(3));
        let class = class(&[ActivityType::Game]);

        let activities = vec![
            activity("Relay race", ActivityType::Game, ActivityCategory::Cardio, 3, 20),
            activity("Jogging intervals", ActivityType::FitnessTraining, ActivityCategory::Cardio, 2, 30),
            activity("Circuit training", ActivityType::FitnessTraining, ActivityCategory::Strength, 4, 40),
            activity("Tug of war", ActivityType::Game, ActivityCategory::Strength, 3, 15),
            activity("Yoga flow", ActivityType::CoolDown, ActivityCategory::Flexibility, 1, 10),
            activity("Dynamic stretching", ActivityType::WarmUp, ActivityCategory::Flexibility, 2, 10),
            activity("Basketball scrimmage", ActivityType::Game, ActivityCategory::TeamSport, 4, 45),
            activity("Passing drill", ActivityType::Drill, ActivityCategory::TeamSport, 3, 20),
        ];

        storage.insert_student(student.clone()).await;
        storage.insert_class(class.clone()).await;
        for a in &activities {
            storage.insert_activity(a.clone()).await;
        }

        Self {
            storage,
            clock,
            student,
            class,
            activities,
        }
    }

    pub fn activity_named(&self, name: &str) -> &ActivityCandidate {
        self.activities
            .iter()
            .find(|a| a.name == name)
            .expect("fixture activity exists")
    }

    pub async fn perform(&self, name: &str, score: f32, days_ago: i64) {
        let activity = self.activity_named(name).clone();
        let at = self.clock_now() - Duration::days(days_ago);
        self.storage
            .record_performance(record(&self.student, &activity, score, at))
            .await
            .expect("valid performance record");
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        use stride_core::Clock;
        self.clock.now()
    }

    pub fn engine(&self) -> RecommendationEngine {
        RecommendationEngine::new(self.storage.clone(), RecommendationConfig::default())
            .with_clock(self.clock.clone())
    }

    pub fn cached_engine(&self) -> (RecommendationEngine, Arc<RecommendationCache>) {
        let cache = Arc::new(CacheStore::with_clock(
            CacheConfig::default(),
            self.clock.clone(),
        ));
        let engine = self.engine().with_cache(cache.clone());
        (engine, cache)
    }
}
