//! Completion resolver: decides what one employee completes this run.
//!
//! Policy (by education type):
//!   A: every offered item
//!   B: the first offered item, positionally (manager items come first)
//!   F: nothing
//!
//! B is deliberately not sampled: given the same ledger order and the same
//! recommendation order, the same item is completed.

use crate::{
    catalog::format_content_id,
    clock::WallClock,
    recommendation::Recommendation,
    roster::{EduType, Employee},
    schedule::TrainingTimes,
    types::{ContentId, EmployeeId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionSource {
    Manager,
    Ai,
}

impl CompletionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Ai => "ai",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerItem {
    pub content_id: ContentId,
    pub name: String,
    pub request_id: String,
}

/// Something an employee was offered this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum TrainingItem {
    Manager(ManagerItem),
    Ai(Recommendation),
}

impl TrainingItem {
    pub fn content_id(&self) -> ContentId {
        match self {
            Self::Manager(m) => m.content_id,
            Self::Ai(r) => r.content_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Manager(m) => &m.name,
            Self::Ai(r) => &r.name,
        }
    }

    pub fn source(&self) -> CompletionSource {
        match self {
            Self::Manager(_) => CompletionSource::Manager,
            Self::Ai(_) => CompletionSource::Ai,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub employee_id: EmployeeId,
    pub content_id: ContentId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub content_name: String,
    pub source: CompletionSource,
}

impl CompletionRecord {
    pub fn key(&self) -> (EmployeeId, ContentId) {
        (self.employee_id, self.content_id)
    }

    /// Digit-grouped form used in artifacts, e.g. `1,915,085`.
    pub fn formatted_content_id(&self) -> String {
        format_content_id(self.content_id)
    }
}

impl EduType {
    /// The prefix of `offered` this type completes.
    pub fn select<'a>(&self, offered: &'a [TrainingItem]) -> &'a [TrainingItem] {
        match self {
            Self::A => offered,
            Self::B => &offered[..offered.len().min(1)],
            Self::F => &[],
        }
    }
}

pub struct CompletionResolver<'a> {
    clock: &'a dyn WallClock,
}

impl<'a> CompletionResolver<'a> {
    pub fn new(clock: &'a dyn WallClock) -> Self {
        Self { clock }
    }

    /// `recommendations` must already be recency-filtered.
    pub fn resolve(
        &self,
        employee: &Employee,
        manager_items: Vec<TrainingItem>,
        recommendations: Vec<Recommendation>,
    ) -> Vec<CompletionRecord> {
        let mut offered = manager_items;
        offered.extend(recommendations.into_iter().map(TrainingItem::Ai));

        let selected = employee.edu_type.select(&offered);
        if selected.is_empty() {
            return Vec::new();
        }

        // One snapshot per employee: the whole batch "finishes" together.
        let times = TrainingTimes::for_snapshot(self.clock.now());

        let records: Vec<CompletionRecord> = selected
            .iter()
            .map(|item| CompletionRecord {
                employee_id: employee.id,
                content_id: item.content_id(),
                started_at: times.started_at,
                completed_at: times.completed_at,
                content_name: item.name().to_string(),
                source: item.source(),
            })
            .collect();

        log::debug!(
            "resolver: employee {} (type {}) completed {} of {} offered",
            employee.id,
            employee.edu_type.code(),
            records.len(),
            offered.len()
        );
        records
    }
}
