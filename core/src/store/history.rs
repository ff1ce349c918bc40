use super::SimStore;
use crate::{
    assignment::Assignment,
    error::SimResult,
    resolver::CompletionRecord,
    schedule::{iso_utc, parse_timestamp, DateRange, DISPLAY_TZ},
    source::{OpenAssignmentRow, OpenAssignmentSource, RecencySource, SourceError, SourceResult},
    types::{ContentId, EmployeeId},
};
use rusqlite::{params, params_from_iter};
use std::collections::HashSet;

impl SimStore {
    // ── Completion history ────────────────────────────────────────

    /// Record a run's generated assignments and its completions together.
    /// Either both tables gain the run's rows or neither does.
    pub fn record_run_history(
        &self,
        run_id: &str,
        assignments: &[Assignment],
        completions: &[CompletionRecord],
    ) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO content_assignments (
                    ba_id, content_id, assignment_date, assignment_begin_date,
                    assignment_due_date, content_type, run_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for a in assignments {
                stmt.execute(params![
                    a.employee_id as i64,
                    a.content_id as i64,
                    iso_utc(&a.created_at),
                    iso_utc(&a.window.start),
                    iso_utc(&a.window.due),
                    &a.content_type,
                    run_id,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO content_completion (
                    ba_id, content_id, completion_date, date_started,
                    date_completed, source, run_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for c in completions {
                let completion_date = c
                    .completed_at
                    .with_timezone(&DISPLAY_TZ)
                    .date_naive()
                    .to_string();
                stmt.execute(params![
                    c.employee_id as i64,
                    c.content_id as i64,
                    completion_date,
                    iso_utc(&c.started_at),
                    iso_utc(&c.completed_at),
                    c.source.as_str(),
                    run_id,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Assignments with no completion for the same (employee, content)
    /// pair, ordered by employee then due date.
    pub fn open_assignments_for(&self, employee_ids: &[EmployeeId]) -> SimResult<Vec<OpenAssignmentRow>> {
        if employee_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (1..=employee_ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT a.ba_id, a.content_id, a.assignment_date, a.assignment_begin_date,
                    a.assignment_due_date, a.content_type
             FROM content_assignments a
             LEFT JOIN content_completion c
                ON a.ba_id = c.ba_id AND a.content_id = c.content_id
             WHERE a.ba_id IN ({placeholders})
               AND c.ba_id IS NULL
             ORDER BY a.ba_id, a.assignment_due_date, a.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let raw = stmt
            .query_map(params_from_iter(employee_ids.iter().map(|id| *id as i64)), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(raw.len());
        for (ba_id, content_id, assigned, begins, due, content_type) in raw {
            let parsed = (parse_timestamp(&assigned), parse_timestamp(&begins), parse_timestamp(&due));
            let (Some(assigned_at), Some(begins_at), Some(due_at)) = parsed else {
                log::warn!("store: skipping assignment {ba_id}/{content_id} with unreadable dates");
                continue;
            };
            rows.push(OpenAssignmentRow {
                employee_id: ba_id as EmployeeId,
                content_id: content_id as ContentId,
                assigned_at,
                begins_at,
                due_at,
                content_type,
            });
        }
        Ok(rows)
    }

    pub fn completed_content_between(
        &self,
        employee_id: EmployeeId,
        range: DateRange,
    ) -> SimResult<HashSet<ContentId>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT content_id FROM content_completion
             WHERE ba_id = ?1 AND completion_date >= ?2 AND completion_date <= ?3",
        )?;
        let ids = stmt
            .query_map(
                params![employee_id as i64, range.start.to_string(), range.end.to_string()],
                |row| row.get::<_, i64>(0),
            )?
            .map(|r| r.map(|id| id as ContentId))
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    pub fn completion_count(&self, run_id: &str) -> SimResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM content_completion WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// Insert a completion row directly. Used to seed history in tests
    /// and when backfilling from an external export.
    pub fn insert_completion_row(
        &self,
        employee_id: EmployeeId,
        content_id: ContentId,
        completion_date: chrono::NaiveDate,
    ) -> SimResult<()> {
        let stamp = format!("{completion_date}T00:00:00+00:00");
        self.conn.execute(
            "INSERT INTO content_completion (
                ba_id, content_id, completion_date, date_started, date_completed, source, run_id
             ) VALUES (?1, ?2, ?3, ?4, ?4, 'import', NULL)",
            params![employee_id as i64, content_id as i64, completion_date.to_string(), stamp],
        )?;
        Ok(())
    }
}

// ── Source adapters ───────────────────────────────────────────────

impl OpenAssignmentSource for SimStore {
    fn open_assignments(&self, employee_ids: &[EmployeeId]) -> SourceResult<Vec<OpenAssignmentRow>> {
        self.open_assignments_for(employee_ids)
            .map_err(|e| SourceError::Query(e.to_string()))
    }
}

impl RecencySource for SimStore {
    fn recently_completed(
        &self,
        employee_id: EmployeeId,
        range: DateRange,
    ) -> SourceResult<HashSet<ContentId>> {
        self.completed_content_between(employee_id, range)
            .map_err(|e| SourceError::Query(e.to_string()))
    }
}
