//! External collaborators the engine consumes.
//!
//! RULE: Sources report failures as a typed SourceError. They never
//! swallow errors into an empty collection; the engine decides whether a
//! failure degrades (recommendations, recency) or aborts the run (open
//! assignments).

use crate::{
    recommendation::Recommendation,
    schedule::DateRange,
    types::{ContentId, EmployeeId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source is not set up for this run. A notice, not a failure.
    #[error("source not configured")]
    NotConfigured,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("query failed: {0}")]
    Query(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// One currently-open assignment as reported by the open-assignments query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAssignmentRow {
    pub employee_id: EmployeeId,
    pub content_id: ContentId,
    pub assigned_at: DateTime<Utc>,
    pub begins_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub content_type: Option<String>,
}

pub trait RecommendationSource {
    fn recommendations(&self, employee_id: EmployeeId) -> SourceResult<Vec<Recommendation>>;
}

pub trait RecencySource {
    /// Distinct content ids completed by `employee_id` within `range`, inclusive.
    fn recently_completed(
        &self,
        employee_id: EmployeeId,
        range: DateRange,
    ) -> SourceResult<HashSet<ContentId>>;
}

pub trait OpenAssignmentSource {
    fn open_assignments(&self, employee_ids: &[EmployeeId]) -> SourceResult<Vec<OpenAssignmentRow>>;
}

/// Stand-in for any source that has not been configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

impl RecommendationSource for Unconfigured {
    fn recommendations(&self, _employee_id: EmployeeId) -> SourceResult<Vec<Recommendation>> {
        Err(SourceError::NotConfigured)
    }
}

impl RecencySource for Unconfigured {
    fn recently_completed(
        &self,
        _employee_id: EmployeeId,
        _range: DateRange,
    ) -> SourceResult<HashSet<ContentId>> {
        Err(SourceError::NotConfigured)
    }
}

impl OpenAssignmentSource for Unconfigured {
    fn open_assignments(&self, _employee_ids: &[EmployeeId]) -> SourceResult<Vec<OpenAssignmentRow>> {
        Err(SourceError::NotConfigured)
    }
}

/// The set of collaborators wired into one engine.
pub struct Sources {
    pub recommendations: Box<dyn RecommendationSource>,
    pub recency: Box<dyn RecencySource>,
    pub open_assignments: Box<dyn OpenAssignmentSource>,
}

impl Sources {
    pub fn unconfigured() -> Self {
        Self {
            recommendations: Box::new(Unconfigured),
            recency: Box::new(Unconfigured),
            open_assignments: Box::new(Unconfigured),
        }
    }
}

/// Collapse an optional source's result into its payload, logging the
/// reason when the source did not deliver.
pub fn degrade<T: Default>(result: SourceResult<T>, what: &str, employee_id: EmployeeId) -> T {
    match result {
        Ok(value) => value,
        Err(SourceError::NotConfigured) => {
            log::info!("{what}: not configured, skipping for employee {employee_id}");
            T::default()
        }
        Err(e) => {
            log::warn!("{what}: failed for employee {employee_id}: {e}");
            T::default()
        }
    }
}
