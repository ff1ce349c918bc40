//! Assignment ledger: every open (not yet completed) assignment.
//!
//! Lifecycle within one run:
//!   1. bulk_load() the imported open assignments
//!   2. append() the freshly generated manager batch
//!   3. hand each employee's entries to the resolver
//!   4. reconcile() against the run's completions
//!   5. the surviving entries are written back out for the next run
//!
//! The ledger is read once and rewritten once per run. A single run is
//! assumed to own it; there is no locking.

use crate::{
    assignment::Assignment,
    catalog::ContentCatalog,
    resolver::{CompletionRecord, ManagerItem, TrainingItem},
    types::{ContentId, EmployeeId},
};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct AssignmentLedger {
    entries: Vec<Assignment>,
}

impl AssignmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Assignment>) -> Self {
        Self { entries }
    }

    pub fn append(&mut self, assignment: Assignment) {
        self.entries.push(assignment);
    }

    pub fn bulk_load(&mut self, assignments: impl IntoIterator<Item = Assignment>) {
        self.entries.extend(assignments);
    }

    pub fn entries(&self) -> &[Assignment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_employee(&self, employee_id: EmployeeId) -> impl Iterator<Item = &Assignment> {
        self.entries
            .iter()
            .filter(move |a| a.employee_id == employee_id)
    }

    /// Resolver input for one employee, in ledger order. Repeated content
    /// ids collapse to their first entry, matching how reconciliation
    /// treats duplicates as a single unit.
    pub fn manager_items(
        &self,
        employee_id: EmployeeId,
        catalog: &ContentCatalog,
    ) -> Vec<TrainingItem> {
        let mut seen = HashSet::new();
        self.for_employee(employee_id)
            .filter(|a| seen.insert(a.content_id))
            .map(|a| {
                TrainingItem::Manager(ManagerItem {
                    content_id: a.content_id,
                    name: catalog.name_for(a.content_id),
                    request_id: a.request_id.clone(),
                })
            })
            .collect()
    }

    /// Remove every entry matched by a completion. See `reconcile`.
    pub fn remove_completed(&mut self, completions: &[CompletionRecord]) -> Reconciliation {
        let entries = std::mem::take(&mut self.entries);
        let result = reconcile(entries, completions);
        self.entries = result.remaining.clone();
        result
    }

    pub fn into_entries(self) -> Vec<Assignment> {
        self.entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub remaining: Vec<Assignment>,
    pub initial_count: usize,
    pub removed_count: usize,
}

impl Reconciliation {
    /// Entries that survived untouched.
    pub fn unchanged_count(&self) -> usize {
        self.remaining.len()
    }
}

/// Stable filter: keep every open assignment whose (employee, content)
/// pair has no completion. All duplicates of a completed pair go.
///
/// Invariant: `removed_count + remaining.len() == open.len()`.
pub fn reconcile(open: Vec<Assignment>, completions: &[CompletionRecord]) -> Reconciliation {
    let completed: HashSet<(EmployeeId, ContentId)> =
        completions.iter().map(CompletionRecord::key).collect();

    let initial_count = open.len();
    let remaining: Vec<Assignment> = open
        .into_iter()
        .filter(|a| !completed.contains(&a.key()))
        .collect();
    let removed_count = initial_count - remaining.len();

    Reconciliation {
        remaining,
        initial_count,
        removed_count,
    }
}
