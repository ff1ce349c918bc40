//! The run event log.
//!
//! RULE: Every decision the engine makes is recorded as a SimEvent.
//! Two runs with the same seed, clock and inputs must produce
//! byte-identical logs.

use crate::{
    resolver::CompletionSource,
    types::{ContentId, EmployeeId, RunId},
};
use serde::{Deserialize, Serialize};

/// Variants are appended over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Run lifecycle ──────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed: u64,
        employees: usize,
    },
    RunCompleted {
        run_id: RunId,
        completions: usize,
        open_assignments: usize,
    },

    // ── Ledger ─────────────────────────────────────
    OpenAssignmentsLoaded {
        count: usize,
    },
    AssignmentsGenerated {
        count: usize,
    },
    LedgerReconciled {
        initial: usize,
        removed: usize,
    },

    // ── Per employee ───────────────────────────────
    SourceDegraded {
        employee_id: EmployeeId,
        source: String,
        reason: String,
    },
    RecommendationsSuppressed {
        employee_id: EmployeeId,
        content_ids: Vec<ContentId>,
    },
    TrainingCompleted {
        employee_id: EmployeeId,
        content_id: ContentId,
        source: CompletionSource,
    },
    EmployeeResolved {
        employee_id: EmployeeId,
        edu_type: String,
        offered: usize,
        completed: usize,
    },
    EmployeeFailed {
        employee_id: EmployeeId,
        reason: String,
    },

    // ── Artifacts ──────────────────────────────────
    ArtifactWritten {
        kind: String,
        file_name: String,
        rows: usize,
    },
}

impl SimEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. } => "run_initialized",
            Self::RunCompleted { .. } => "run_completed",
            Self::OpenAssignmentsLoaded { .. } => "open_assignments_loaded",
            Self::AssignmentsGenerated { .. } => "assignments_generated",
            Self::LedgerReconciled { .. } => "ledger_reconciled",
            Self::SourceDegraded { .. } => "source_degraded",
            Self::RecommendationsSuppressed { .. } => "recommendations_suppressed",
            Self::TrainingCompleted { .. } => "training_completed",
            Self::EmployeeResolved { .. } => "employee_resolved",
            Self::EmployeeFailed { .. } => "employee_failed",
            Self::ArtifactWritten { .. } => "artifact_written",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub seq: u64,
    pub stage: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}
