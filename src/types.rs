//! Core data types for the Stride recommendation system
//!
//! These types mirror the entities owned by the persistence layer (students,
//! classes, activities, performance records) plus the transient request and
//! result types produced by the recommender. Everything here is read-only
//! from the recommender's point of view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an ID from a string
            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for students
    StudentId
);
entity_id!(
    /// Unique identifier for classes
    ClassId
);
entity_id!(
    /// Unique identifier for activities
    ActivityId
);

/// Kind of activity within a lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    WarmUp,
    SkillDevelopment,
    Drill,
    Game,
    FitnessTraining,
    CoolDown,
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityType::WarmUp => "warm_up",
            ActivityType::SkillDevelopment => "skill_development",
            ActivityType::Drill => "drill",
            ActivityType::Game => "game",
            ActivityType::FitnessTraining => "fitness_training",
            ActivityType::CoolDown => "cool_down",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "warm_up" | "warmup" => Ok(ActivityType::WarmUp),
            "skill_development" | "skill" => Ok(ActivityType::SkillDevelopment),
            "drill" => Ok(ActivityType::Drill),
            "game" => Ok(ActivityType::Game),
            "fitness_training" | "fitness" => Ok(ActivityType::FitnessTraining),
            "cool_down" | "cooldown" => Ok(ActivityType::CoolDown),
            other => Err(format!("unknown activity type: {}", other)),
        }
    }
}

/// Category tag used for class focus areas and balanced diversification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Cardio,
    Strength,
    Flexibility,
    Balance,
    Coordination,
    Agility,
    TeamSport,
    IndividualSport,
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityCategory::Cardio => "cardio",
            ActivityCategory::Strength => "strength",
            ActivityCategory::Flexibility => "flexibility",
            ActivityCategory::Balance => "balance",
            ActivityCategory::Coordination => "coordination",
            ActivityCategory::Agility => "agility",
            ActivityCategory::TeamSport => "team_sport",
            ActivityCategory::IndividualSport => "individual_sport",
        };
        write!(f, "{}", s)
    }
}

/// How much equipment an activity needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentRequirement {
    None,
    Minimal,
    Moderate,
    Extensive,
}

/// Student as seen by the recommender
///
/// Levels are ordinals on a 1-5 scale. A missing level makes the
/// corresponding match factor contribute zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: StudentId,
    pub name: String,
    #[serde(default)]
    pub skill_level: Option<u8>,
    #[serde(default)]
    pub fitness_level: Option<u8>,
}

/// Class the recommendation is made for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassContext {
    pub id: ClassId,
    pub name: String,

    /// Category tags the class concentrates on
    #[serde(default)]
    pub focus_areas: Option<HashSet<ActivityCategory>>,

    /// Activity types the class curriculum requires
    #[serde(default)]
    pub required_activity_types: Option<HashSet<ActivityType>>,
}

impl ClassContext {
    /// True when the class declares at least one required activity type
    pub fn has_requirements(&self) -> bool {
        self.required_activity_types
            .as_ref()
            .is_some_and(|types| !types.is_empty())
    }
}

/// Activity being evaluated for recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityCandidate {
    pub id: ActivityId,
    pub name: String,
    pub activity_type: ActivityType,
    pub category: ActivityCategory,

    /// Perceived difficulty (1-5), compared against preferred difficulty
    #[serde(default)]
    pub difficulty_level: Option<u8>,

    /// Skill level the activity is pitched at (1-5)
    #[serde(default)]
    pub skill_level: Option<u8>,

    /// Fitness level the activity demands (1-5)
    #[serde(default)]
    pub fitness_level: Option<u8>,

    pub equipment: EquipmentRequirement,

    /// Duration in minutes
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

/// One assessment of a student on an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub student_id: StudentId,
    pub activity_id: ActivityId,
    /// Score on a 0-100 scale
    pub score: f32,
    pub recorded_at: DateTime<Utc>,
}

/// Caller-supplied preferences for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceInput {
    #[serde(default)]
    pub activity_types: Option<HashSet<ActivityType>>,
    /// Preferred difficulty (1-5)
    #[serde(default)]
    pub difficulty: Option<u8>,
    /// Preferred duration in minutes
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub equipment: Option<HashSet<EquipmentRequirement>>,
}

/// Sub-scores that produced an overall recommendation score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill_level_match: f32,
    pub fitness_level_match: f32,
    pub preference_match: f32,
    pub class_requirements: f32,
    pub recent_performance: f32,
}

/// Activity with its recommendation score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecommendation {
    pub activity: ActivityCandidate,
    /// Overall score in [0, 1]
    pub score: f32,
    pub breakdown: ScoreBreakdown,
}
