//! In-memory persistence backend
//!
//! Holds a [`Dataset`] behind a tokio `RwLock`. Used by the CLI (loading a
//! JSON dataset file) and by tests.

use super::PersistenceBackend;
use crate::error::{Result, StrideError};
use crate::types::{
    ActivityCandidate, ActivityId, ClassContext, ClassId, PerformanceRecord, StudentId,
    StudentProfile,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

/// Serializable snapshot of all entities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub students: Vec<StudentProfile>,
    #[serde(default)]
    pub classes: Vec<ClassContext>,
    #[serde(default)]
    pub activities: Vec<ActivityCandidate>,
    #[serde(default)]
    pub performance: Vec<PerformanceRecord>,
}

impl Dataset {
    /// Load a dataset from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&contents)?;
        debug!(
            "Loaded dataset from {}: {} students, {} classes, {} activities, {} records",
            path.display(),
            dataset.students.len(),
            dataset.classes.len(),
            dataset.activities.len(),
            dataset.performance.len()
        );
        Ok(dataset)
    }
}

#[derive(Debug, Default)]
struct Tables {
    students: HashMap<StudentId, StudentProfile>,
    classes: HashMap<ClassId, ClassContext>,
    /// Insertion order is the enumeration order
    activities: Vec<ActivityCandidate>,
    performance: Vec<PerformanceRecord>,
}

/// Backend keeping every entity in process memory
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: RwLock<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        let tables = Tables {
            students: dataset.students.into_iter().map(|s| (s.id, s)).collect(),
            classes: dataset.classes.into_iter().map(|c| (c.id, c)).collect(),
            activities: dataset.activities,
            performance: dataset.performance,
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        Ok(Self::from_dataset(Dataset::from_json_file(path)?))
    }

    pub async fn insert_student(&self, student: StudentProfile) {
        self.tables.write().await.students.insert(student.id, student);
    }

    pub async fn insert_class(&self, class: ClassContext) {
        self.tables.write().await.classes.insert(class.id, class);
    }

    /// Add an activity, replacing one with the same ID in place
    pub async fn insert_activity(&self, activity: ActivityCandidate) {
        let mut tables = self.tables.write().await;
        match tables.activities.iter_mut().find(|a| a.id == activity.id) {
            Some(existing) => *existing = activity,
            None => tables.activities.push(activity),
        }
    }

    /// Record an assessment
    ///
    /// Scores must lie on the 0-100 scale.
    pub async fn record_performance(&self, record: PerformanceRecord) -> Result<()> {
        if !(0.0..=100.0).contains(&record.score) {
            return Err(StrideError::Validation(format!(
                "performance score must be between 0 and 100, got {}",
                record.score
            )));
        }
        self.tables.write().await.performance.push(record);
        Ok(())
    }
}

#[async_trait]
impl PersistenceBackend for InMemoryStorage {
    async fn find_student(&self, id: StudentId) -> Result<Option<StudentProfile>> {
        Ok(self.tables.read().await.students.get(&id).cloned())
    }

    async fn find_class(&self, id: ClassId) -> Result<Option<ClassContext>> {
        Ok(self.tables.read().await.classes.get(&id).cloned())
    }

    async fn find_activity(&self, id: ActivityId) -> Result<Option<ActivityCandidate>> {
        Ok(self
            .tables
            .read()
            .await
            .activities
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_activities(&self) -> Result<Vec<ActivityCandidate>> {
        Ok(self.tables.read().await.activities.clone())
    }

    async fn list_performance(
        &self,
        student_id: StudentId,
        activity_id: Option<ActivityId>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PerformanceRecord>> {
        let tables = self.tables.read().await;

        let mut records: Vec<PerformanceRecord> = tables
            .performance
            .iter()
            .filter(|r| r.student_id == student_id)
            .filter(|r| activity_id.map_or(true, |id| r.activity_id == id))
            .filter(|r| since.map_or(true, |since| r.recorded_at >= since))
            .cloned()
            .collect();

        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(records)
    }
}
