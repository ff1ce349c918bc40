//! Roster parsing.

use std::io::Cursor;
use trainsim_core::{
    error::SimError,
    roster::{EduType, Employee, Roster},
};

fn parse(text: &str) -> Result<Roster, SimError> {
    Roster::parse(Cursor::new(text))
}

#[test]
fn parses_rows_in_order() {
    let roster = parse("employee_id,employee_edu_type\n1001,a\n1002,F\n1003, b \n").unwrap();
    assert_eq!(
        roster.employees,
        vec![
            Employee::new(1001, EduType::A),
            Employee::new(1002, EduType::F),
            Employee::new(1003, EduType::B),
        ]
    );
    assert_eq!(roster.ids(), vec![1001, 1002, 1003]);
}

#[test]
fn comment_rows_are_counted_and_skipped() {
    let roster = parse("employee_id,employee_edu_type\n# header note\n1001,A\n\n#1002,B\n").unwrap();
    assert_eq!(roster.employees.len(), 1);
    assert_eq!(roster.comment_rows, 2);
}

#[test]
fn column_order_comes_from_the_header() {
    let roster = parse("\"employee_edu_type\",\"employee_id\"\n\"b\",\"7\"\n").unwrap();
    assert_eq!(roster.employees, vec![Employee::new(7, EduType::B)]);
}

#[test]
fn bad_education_type_reports_its_line() {
    let err = parse("employee_id,employee_edu_type\n1001,A\n1002,Z\n").unwrap_err();
    assert!(
        matches!(err, SimError::Roster { line: 3, .. }),
        "expected a roster error on line 3, got {err:?}"
    );
}

#[test]
fn bad_id_is_rejected() {
    let err = parse("employee_id,employee_edu_type\nabc,A\n").unwrap_err();
    assert!(matches!(err, SimError::Roster { line: 2, .. }), "got {err:?}");
}

#[test]
fn missing_column_is_rejected() {
    let err = parse("employee_id,team\n1001,x\n").unwrap_err();
    assert!(matches!(err, SimError::Roster { line: 1, .. }), "got {err:?}");
}

/// Ids are unique: a repeat would generate and resolve the same
/// employee twice.
#[test]
fn repeated_id_is_rejected() {
    let err = parse("employee_id,employee_edu_type\n1001,a\n1002,b\n1001,a\n").unwrap_err();
    assert!(
        matches!(err, SimError::Roster { line: 4, ref reason } if reason.contains("1001")),
        "expected a duplicate-id error on line 4, got {err:?}"
    );
}

/// Spreadsheet exports often start with a byte-order mark.
#[test]
fn byte_order_mark_on_header_is_ignored() {
    let roster = parse("\u{feff}employee_id,employee_edu_type\n1001,A\n").unwrap();
    assert_eq!(roster.employees, vec![Employee::new(1001, EduType::A)]);
}

#[test]
fn empty_input_is_an_empty_roster() {
    let roster = parse("").unwrap();
    assert!(roster.employees.is_empty());
}
