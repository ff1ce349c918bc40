//! Manager assignments: the ledger's unit, and the generator that
//! creates a fresh batch every run.

use crate::{
    catalog::ContentCatalog,
    rng::StreamRng,
    roster::Employee,
    schedule::{RunStamp, SchedulingWindow},
    source::OpenAssignmentRow,
    types::{ContentId, EmployeeId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTENT_TYPE: &str = "Media";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub employee_id: EmployeeId,
    pub content_id: ContentId,
    pub created_at: DateTime<Utc>,
    pub request_id: String,
    pub window: SchedulingWindow,
    pub content_type: String,
}

impl Assignment {
    /// Completion-matching key. Duplicate keys reconcile as one unit.
    pub fn key(&self) -> (EmployeeId, ContentId) {
        (self.employee_id, self.content_id)
    }

    /// Carry an imported open assignment into this run. Its dates are
    /// kept; the request id is re-stamped with this run's.
    pub fn from_open_row(row: OpenAssignmentRow, stamp: &RunStamp) -> Self {
        Self {
            employee_id: row.employee_id,
            content_id: row.content_id,
            created_at: row.assigned_at,
            request_id: stamp.request_id.clone(),
            window: SchedulingWindow {
                start: row.begins_at,
                due: row.due_at,
            },
            content_type: row
                .content_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        }
    }
}

/// Creates the weekly manager batch: every daily-dose item, plus one
/// general-pool item drawn uniformly per employee.
pub struct AssignmentGenerator<'a> {
    catalog: &'a ContentCatalog,
}

impl<'a> AssignmentGenerator<'a> {
    pub fn new(catalog: &'a ContentCatalog) -> Self {
        Self { catalog }
    }

    pub fn generate(
        &self,
        employees: &[Employee],
        stamp: &RunStamp,
        rng: &mut StreamRng,
    ) -> Vec<Assignment> {
        let daily = self.catalog.daily_dose();
        let general = self.catalog.general_pool();
        if general.is_empty() && !employees.is_empty() {
            log::warn!("assignment: general pool is empty, issuing daily dose only");
        }

        let mut out = Vec::with_capacity(employees.len() * (daily.len() + 1));
        for employee in employees {
            let picked = rng.choose(&general).map(|item| item.id);
            let content_ids = daily.iter().map(|item| item.id).chain(picked);
            out.extend(content_ids.map(|content_id| Assignment {
                employee_id: employee.id,
                content_id,
                created_at: stamp.captured_at,
                request_id: stamp.request_id.clone(),
                window: stamp.window,
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
            }));
        }

        log::info!("assignment: created {} new manager assignments", out.len());
        out
    }
}
