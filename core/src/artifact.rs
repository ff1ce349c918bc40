//! CSV artifacts: the completion file, the open-assignment ledger file
//! and the user-completion template copy.
//!
//! Every field is quoted on write. Reads accept quoted or bare fields,
//! which is enough for the grouped content ids ("1,915,085") the ledger
//! file carries.

use crate::{
    assignment::Assignment,
    catalog::{format_content_id, parse_content_id},
    error::SimResult,
    resolver::CompletionRecord,
    schedule::{iso_utc, parse_timestamp, SchedulingWindow},
};
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const COMPLETION_HEADER: [&str; 4] = ["UserId", "ContentId", "DateStarted", "DateCompleted"];

pub const LEDGER_HEADER: [&str; 7] = [
    "UserID",
    "CreateDate_text",
    "RequestId",
    "TrainingElementId",
    "Start_Date_text",
    "DueDate_text",
    "ContentType",
];

// ── CSV primitives ────────────────────────────────────────────────

pub(crate) fn quote_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| format!("\"{}\"", f.as_ref().replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split one CSV line, honouring double-quoted fields and `""` escapes.
pub(crate) fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches(['\r', '\n']).chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', _) => in_quotes = !in_quotes,
            (',', false) => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn write_rows<P: AsRef<Path>>(path: P, header: &[&str], rows: Vec<Vec<String>>) -> SimResult<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    writeln!(out, "{}", quote_row(header))?;
    for row in rows {
        writeln!(out, "{}", quote_row(&row[..]))?;
    }
    out.flush()?;
    Ok(())
}

// ── Completion file ───────────────────────────────────────────────

pub fn write_completion_file<P: AsRef<Path>>(path: P, records: &[CompletionRecord]) -> SimResult<()> {
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.employee_id.to_string(),
                r.formatted_content_id(),
                iso_utc(&r.started_at),
                iso_utc(&r.completed_at),
            ]
        })
        .collect();
    write_rows(path, &COMPLETION_HEADER, rows)
}

// ── Ledger file ───────────────────────────────────────────────────

pub fn write_ledger_file<P: AsRef<Path>>(path: P, assignments: &[Assignment]) -> SimResult<()> {
    let rows = assignments
        .iter()
        .map(|a| {
            vec![
                a.employee_id.to_string(),
                iso_utc(&a.created_at),
                a.request_id.clone(),
                format_content_id(a.content_id),
                iso_utc(&a.window.start),
                iso_utc(&a.window.due),
                a.content_type.clone(),
            ]
        })
        .collect();
    write_rows(path, &LEDGER_HEADER, rows)
}

/// Read a ledger file back. Rows that do not parse are skipped with a
/// warning; one bad row never loses the rest of the ledger.
pub fn read_ledger_file<P: AsRef<Path>>(path: P) -> SimResult<Vec<Assignment>> {
    let reader = BufReader::new(fs::File::open(path.as_ref())?);
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_ledger_row(&split_csv_line(&line)) {
            Some(a) => out.push(a),
            None => log::warn!(
                "artifact: skipping malformed ledger row {} in {}",
                idx + 1,
                path.as_ref().display()
            ),
        }
    }
    Ok(out)
}

fn parse_ledger_row(fields: &[String]) -> Option<Assignment> {
    let [user, created, request, content, start, due, content_type] = fields else {
        return None;
    };
    Some(Assignment {
        employee_id: user.trim().parse().ok()?,
        content_id: parse_content_id(content)?,
        created_at: parse_timestamp(created)?,
        request_id: request.clone(),
        window: SchedulingWindow {
            start: parse_timestamp(start)?,
            due: parse_timestamp(due)?,
        },
        content_type: content_type.clone(),
    })
}

// ── Housekeeping ──────────────────────────────────────────────────

/// Copy the user-completion template under its run-stamped name.
/// A missing template is a notice, not an error.
pub fn copy_user_completion_template(template: &str, dest: &Path) -> SimResult<Option<PathBuf>> {
    if !Path::new(template).is_file() {
        log::info!("artifact: user completion template not found: {template}");
        return Ok(None);
    }
    fs::copy(template, dest)?;
    Ok(Some(dest.to_path_buf()))
}

/// Remove regular files left by earlier runs. `.gitkeep` and
/// subdirectories are kept. Files that cannot be removed are warned about.
pub fn clean_output_dir(dir: &Path) -> SimResult<usize> {
    if !dir.is_dir() {
        log::info!("artifact: {} does not exist, nothing to clean", dir.display());
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.file_name().is_some_and(|n| n == ".gitkeep") {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => log::warn!("artifact: could not remove {}: {e}", path.display()),
        }
    }
    log::info!("artifact: cleaned {} - removed {removed} file(s)", dir.display());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_handles_quoted_commas_and_escapes() {
        assert_eq!(
            split_csv_line("\"10\",\"1,915,085\",\"say \"\"hi\"\"\""),
            vec!["10", "1,915,085", "say \"hi\""]
        );
        assert_eq!(split_csv_line("1001,a"), vec!["1001", "a"]);
        assert_eq!(split_csv_line("1,,x\r"), vec!["1", "", "x"]);
    }

    #[test]
    fn quote_row_round_trips_through_split() {
        let row = ["10", "1,000", "a \"b\""];
        assert_eq!(split_csv_line(&quote_row(&row[..])), row);
    }
}
