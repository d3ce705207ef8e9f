//! Persistence collaborator for the recommender
//!
//! The recommender only reads entities; it never writes them. Backends answer
//! "not found" with `Ok(None)` and reserve errors for real failures.

pub mod memory;

use crate::error::Result;
use crate::types::{
    ActivityCandidate, ActivityId, ClassContext, ClassId, PerformanceRecord, StudentId,
    StudentProfile,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::{Dataset, InMemoryStorage};

/// Read-only view of the relational store
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Look up a student
    async fn find_student(&self, id: StudentId) -> Result<Option<StudentProfile>>;

    /// Look up a class
    async fn find_class(&self, id: ClassId) -> Result<Option<ClassContext>>;

    /// Look up an activity
    async fn find_activity(&self, id: ActivityId) -> Result<Option<ActivityCandidate>>;

    /// Every activity that can be recommended, in a stable order
    async fn list_activities(&self) -> Result<Vec<ActivityCandidate>>;

    /// A student's performance records, newest first
    ///
    /// Narrowed to one activity and/or to records at or after `since` when
    /// those are given.
    async fn list_performance(
        &self,
        student_id: StudentId,
        activity_id: Option<ActivityId>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PerformanceRecord>>;
}
