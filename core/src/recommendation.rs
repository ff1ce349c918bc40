//! AI recommendations and the recency filter.
//!
//! Recommendations are ephemeral: fetched fresh per employee per run,
//! filtered, and either completed or dropped. Nothing here is persisted.

use crate::types::{ContentId, EmployeeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub employee_id: EmployeeId,
    pub content_id: ContentId,
    pub name: String,
}

impl Recommendation {
    pub fn new(employee_id: EmployeeId, content_id: ContentId, name: impl Into<String>) -> Self {
        Self {
            employee_id,
            content_id,
            name: name.into(),
        }
    }
}

/// Drop recommendations whose content was completed within the recency
/// window. Order is preserved; the operation is idempotent.
///
/// Only AI recommendations pass through here. Manager assignments are
/// completed even when the same content was finished recently.
pub fn filter_recent(
    recommendations: Vec<Recommendation>,
    recently_completed: &HashSet<ContentId>,
) -> Vec<Recommendation> {
    if recently_completed.is_empty() {
        return recommendations;
    }
    recommendations
        .into_iter()
        .filter(|r| !recently_completed.contains(&r.content_id))
        .collect()
}
