//! Employee roster: loaded once per run, immutable afterwards.

use crate::{
    artifact::split_csv_line,
    error::{SimError, SimResult},
    types::EmployeeId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::BufRead;

/// Education type: the completion policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EduType {
    /// Completes everything offered.
    A,
    /// Completes the first item offered.
    B,
    /// Completes nothing.
    F,
}

impl EduType {
    /// Case-insensitive, whitespace-tolerant.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "f" => Some(Self::F),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::F => "f",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub edu_type: EduType,
}

impl Employee {
    pub fn new(id: EmployeeId, edu_type: EduType) -> Self {
        Self { id, edu_type }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub employees: Vec<Employee>,
    /// Rows skipped because their id column starts with `#`.
    pub comment_rows: usize,
}

impl Roster {
    pub fn ids(&self) -> Vec<EmployeeId> {
        self.employees.iter().map(|e| e.id).collect()
    }

    pub fn open(path: &str) -> SimResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::parse(std::io::BufReader::new(file))
    }

    /// Parse a roster with an `employee_id,employee_edu_type` header.
    /// Column order is taken from the header.
    pub fn parse<R: BufRead>(reader: R) -> SimResult<Self> {
        let mut lines = reader.lines().enumerate();

        let header = match lines.next() {
            Some((_, line)) => split_csv_line(line?.trim_start_matches('\u{feff}')),
            None => return Ok(Self::default()),
        };
        let column = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| SimError::Roster {
                    line: 1,
                    reason: format!("missing column '{name}'"),
                })
        };
        let id_col = column("employee_id")?;
        let type_col = column("employee_edu_type")?;

        let mut roster = Self::default();
        let mut seen = HashSet::new();
        for (idx, line) in lines {
            let line = line?;
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_csv_line(&line);
            let raw_id = fields.get(id_col).map(|s| s.trim()).unwrap_or_default();
            if raw_id.starts_with('#') {
                roster.comment_rows += 1;
                continue;
            }
            let id = raw_id.parse::<EmployeeId>().map_err(|_| SimError::Roster {
                line: line_no,
                reason: format!("invalid employee id '{raw_id}'"),
            })?;
            let raw_type = fields.get(type_col).map(String::as_str).unwrap_or_default();
            let edu_type = EduType::parse(raw_type).ok_or_else(|| SimError::Roster {
                line: line_no,
                reason: format!("invalid education type '{raw_type}' for employee {id}"),
            })?;
            if !seen.insert(id) {
                return Err(SimError::Roster {
                    line: line_no,
                    reason: format!("employee {id} is listed more than once"),
                });
            }
            roster.employees.push(Employee::new(id, edu_type));
        }

        if roster.comment_rows > 0 {
            log::info!("roster: filtered out {} comment row(s)", roster.comment_rows);
        }
        log::info!("roster: loaded {} employee(s)", roster.employees.len());
        Ok(roster)
    }
}
