//! Artifact files written by a run into a scratch output directory.

use std::fs;
use std::path::Path;
use trainsim_core::{
    artifact::read_ledger_file,
    config::SimConfig,
    engine::SimEngine,
    error::SimError,
    roster::{EduType, Employee, Roster},
};

fn roster(rows: &[(u64, EduType)]) -> Roster {
    Roster {
        employees: rows.iter().map(|&(id, t)| Employee::new(id, t)).collect(),
        comment_rows: 0,
    }
}

fn config_for(dir: &Path) -> SimConfig {
    SimConfig {
        output_dir: Some(dir.to_string_lossy().into_owned()),
        clean_output_dir: true,
        ..SimConfig::default_test()
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn completion_and_ledger_files_use_the_run_stamp() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = SimEngine::build_test("artifact-test".into(), 42)
        .unwrap()
        .with_config(config_for(dir.path()));
    let summary = engine
        .run(&roster(&[(1001, EduType::A), (1002, EduType::F)]))
        .unwrap();

    assert_eq!(
        file_names(dir.path()),
        vec![
            "ContentUserCompletion_V2_2026_03_04_1_133000.csv",
            "Non_Completed_Assignments_V2_2026_3_4_1_133000.csv",
        ]
    );
    assert_eq!(summary.artifacts.len(), 2);

    let completions =
        fs::read_to_string(dir.path().join("ContentUserCompletion_V2_2026_03_04_1_133000.csv")).unwrap();
    let lines: Vec<_> = completions.lines().collect();
    assert_eq!(lines[0], r#""UserId","ContentId","DateStarted","DateCompleted""#);
    assert_eq!(
        lines[1],
        r#""1001","2,033,875","2026-03-04T21:15:00+00:00","2026-03-04T21:19:00+00:00""#
    );
    assert_eq!(lines.len(), 4, "header plus three completions");

    let ledger =
        fs::read_to_string(dir.path().join("Non_Completed_Assignments_V2_2026_3_4_1_133000.csv")).unwrap();
    let lines: Vec<_> = ledger.lines().collect();
    assert_eq!(
        lines[0],
        r#""UserID","CreateDate_text","RequestId","TrainingElementId","Start_Date_text","DueDate_text","ContentType""#
    );
    assert_eq!(
        lines[1],
        r#""1002","2026-03-04T21:30:00+00:00","fake:04","2,033,875","2026-03-02T01:15:00+00:00","2026-03-09T01:03:00+00:00","Media""#
    );
    assert_eq!(lines.len(), 4, "header plus type F's three open assignments");
}

/// The ledger file is the next run's input; it reads back to what the
/// run left open.
#[test]
fn ledger_file_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = SimEngine::build_test("ledger-read-test".into(), 7)
        .unwrap()
        .with_config(config_for(dir.path()));
    let summary = engine
        .run(&roster(&[(1001, EduType::F), (1002, EduType::B)]))
        .unwrap();

    let path = dir.path().join("Non_Completed_Assignments_V2_2026_3_4_1_133000.csv");
    let read = read_ledger_file(&path).unwrap();
    assert_eq!(read, summary.open_assignments());
}

#[test]
fn no_completions_means_no_completion_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = SimEngine::build_test("no-completion-test".into(), 42)
        .unwrap()
        .with_config(config_for(dir.path()));
    engine.run(&roster(&[(1002, EduType::F)])).unwrap();

    assert_eq!(
        file_names(dir.path()),
        vec!["Non_Completed_Assignments_V2_2026_3_4_1_133000.csv"]
    );
}

/// A run whose artifacts cannot be written leaves no history behind, so
/// the next run still sees its assignments as open.
#[test]
fn failed_artifact_write_records_no_history() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the ledger file should go; cleanup leaves it alone.
    fs::create_dir(dir.path().join("Non_Completed_Assignments_V2_2026_3_4_1_133000.csv")).unwrap();

    let mut engine = SimEngine::build_test("failed-write-test".into(), 42)
        .unwrap()
        .with_config(config_for(dir.path()));
    let err = engine
        .run(&roster(&[(1001, EduType::A), (1002, EduType::F)]))
        .unwrap_err();

    assert!(matches!(err, SimError::Io(_)), "expected an io error, got {err:?}");
    assert_eq!(engine.store.completion_count("failed-write-test").unwrap(), 0);
    assert!(
        engine.store.open_assignments_for(&[1001, 1002]).unwrap().is_empty(),
        "no assignments should be recorded either"
    );
}

#[test]
fn stale_files_are_cleaned_but_gitkeep_survives() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".gitkeep"), "").unwrap();
    fs::write(dir.path().join("stale.csv"), "old").unwrap();
    fs::create_dir(dir.path().join("archive")).unwrap();

    let mut engine = SimEngine::build_test("clean-test".into(), 42)
        .unwrap()
        .with_config(config_for(dir.path()));
    engine.run(&roster(&[(1002, EduType::F)])).unwrap();

    let names = file_names(dir.path());
    assert!(!names.contains(&"stale.csv".to_string()), "stale file should be removed");
    assert!(names.contains(&".gitkeep".to_string()));
    assert!(names.contains(&"archive".to_string()));
}

#[test]
fn user_completion_template_is_copied_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let template_dir = tempfile::tempdir().unwrap();
    let template = template_dir.path().join("UserCompletion_template.csv");
    fs::write(&template, "\"UserId\",\"Completed\"\n").unwrap();

    let mut config = config_for(dir.path());
    config.user_completion_template = Some(template.to_string_lossy().into_owned());
    let mut engine = SimEngine::build_test("template-test".into(), 42)
        .unwrap()
        .with_config(config);
    engine.run(&roster(&[(1002, EduType::F)])).unwrap();

    let copied = dir.path().join("UserCompletion_v2_2026_3_4_1_133000.csv");
    assert_eq!(fs::read_to_string(copied).unwrap(), "\"UserId\",\"Completed\"\n");
}

#[test]
fn missing_template_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.user_completion_template = Some(dir.path().join("nope.csv").to_string_lossy().into_owned());
    let mut engine = SimEngine::build_test("no-template-test".into(), 42)
        .unwrap()
        .with_config(config);
    let summary = engine.run(&roster(&[(1002, EduType::F)])).unwrap();
    assert_eq!(summary.artifacts.len(), 1);
}

/// A non-zero tag length appends a seeded tag; same seed, same tag.
#[test]
fn file_tag_is_seeded() {
    let tagged_names = |run_id: &str| {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.file_tag_len = 6;
        let mut engine = SimEngine::build_test(run_id.into(), 99)
            .unwrap()
            .with_config(config);
        engine.run(&roster(&[(1002, EduType::F)])).unwrap();
        file_names(dir.path())
    };

    let first = tagged_names("tag-a");
    let second = tagged_names("tag-b");
    assert_eq!(first, second);

    let name = &first[0];
    let tag = name
        .strip_prefix("Non_Completed_Assignments_V2_2026_3_4_1_133000")
        .and_then(|rest| rest.strip_suffix(".csv"))
        .unwrap();
    assert_eq!(tag.len(), 6);
    assert!(tag.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
}
