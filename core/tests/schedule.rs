//! Weekly anchors, training slot and dual-zone rendering.
//!
//! The reference instant is Wednesday 2026-03-04 21:30 UTC, which is
//! 13:30 PST on the same calendar day.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use trainsim_core::{
    clock::FixedClock,
    naming::ArtifactKind,
    schedule::{
        iso_utc, parse_timestamp, recency_range, request_id_for, week_due_anchor,
        week_start_anchor, RunStamp, SchedulingWindow, TrainingTimes,
    },
};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

#[test]
fn start_anchor_is_monday_not_sunday() {
    let start = week_start_anchor(FixedClock::reference().0);
    assert_eq!(start.weekday(), Weekday::Mon, "anchor must land on Monday");
    assert_eq!(iso_utc(&start), "2026-03-02T01:15:00+00:00");
}

#[test]
fn due_anchor_is_the_following_monday() {
    let due = week_due_anchor(FixedClock::reference().0);
    assert_eq!(due.weekday(), Weekday::Mon);
    assert_eq!(iso_utc(&due), "2026-03-09T01:03:00+00:00");
}

#[test]
fn monday_and_sunday_edges() {
    // Monday itself anchors to the same day.
    assert_eq!(week_start_anchor(utc(2026, 3, 2, 23, 0)), utc(2026, 3, 2, 1, 15));
    // Sunday reaches back six days.
    assert_eq!(week_start_anchor(utc(2026, 3, 8, 12, 0)), utc(2026, 3, 2, 1, 15));
    // Weekday is judged in UTC: Monday 03:00 UTC is still Sunday in PT.
    assert_eq!(week_start_anchor(utc(2026, 3, 9, 3, 0)), utc(2026, 3, 9, 1, 15));
}

#[test]
fn window_spans_seven_days_less_twelve_minutes() {
    let window = SchedulingWindow::for_week_of(FixedClock::reference().0);
    assert_eq!((window.due - window.start).num_minutes(), 7 * 24 * 60 - 12);
}

#[test]
fn training_slot_is_early_afternoon_pacific() {
    let times = TrainingTimes::for_snapshot(FixedClock::reference().0);
    assert_eq!(iso_utc(&times.started_at), "2026-03-04T21:15:00+00:00");
    assert_eq!(iso_utc(&times.completed_at), "2026-03-04T21:19:00+00:00");

    // After the 2026-03-08 DST switch the offset is seven hours.
    let times = TrainingTimes::for_snapshot(utc(2026, 3, 10, 20, 0));
    assert_eq!(iso_utc(&times.started_at), "2026-03-10T20:15:00+00:00");
    assert_eq!(iso_utc(&times.completed_at), "2026-03-10T20:19:00+00:00");
}

/// 03:00 UTC on Mar 5 is 19:00 PST on Mar 4. Display-zone values use
/// the 4th; the anchors still use the UTC weekday.
#[test]
fn dual_zone_near_utc_midnight() {
    let now = utc(2026, 3, 5, 3, 0);
    let stamp = RunStamp::capture(now);

    assert_eq!(stamp.request_id, "fake:04");
    assert_eq!(stamp.local_date(), NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
    assert_eq!(stamp.local_hms(), "190000");
    assert_eq!(
        ArtifactKind::Completions.file_name(&stamp, ""),
        "ContentUserCompletion_V2_2026_03_04_1_190000.csv"
    );

    let times = TrainingTimes::for_snapshot(now);
    assert_eq!(iso_utc(&times.started_at), "2026-03-04T21:15:00+00:00");
    assert_eq!(iso_utc(&stamp.window.start), "2026-03-02T01:15:00+00:00");
}

#[test]
fn request_id_is_zero_padded_pacific_day() {
    assert_eq!(request_id_for(FixedClock::reference().0), "fake:04");
    assert_eq!(request_id_for(utc(2026, 10, 18, 19, 0)), "fake:18");
}

#[test]
fn artifact_names_pad_only_the_completion_file() {
    let stamp = RunStamp::capture(FixedClock::reference().0);
    assert_eq!(
        ArtifactKind::Completions.file_name(&stamp, ""),
        "ContentUserCompletion_V2_2026_03_04_1_133000.csv"
    );
    assert_eq!(
        ArtifactKind::OpenAssignments.file_name(&stamp, ""),
        "Non_Completed_Assignments_V2_2026_3_4_1_133000.csv"
    );
    assert_eq!(
        ArtifactKind::UserCompletion.file_name(&stamp, ""),
        "UserCompletion_v2_2026_3_4_1_133000.csv"
    );
    assert_eq!(
        ArtifactKind::OpenAssignments.file_name(&stamp, "k3x9"),
        "Non_Completed_Assignments_V2_2026_3_4_1_133000k3x9.csv"
    );
}

#[test]
fn recency_range_covers_today_and_prior_days() {
    let range = recency_range(FixedClock::reference().0, 14);
    assert_eq!(range.end, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
    assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 2, 19).unwrap());

    let one_day = recency_range(FixedClock::reference().0, 1);
    assert_eq!(one_day.start, one_day.end);
}

#[test]
fn iso_rendering_matches_downstream_layout() {
    assert_eq!(iso_utc(&utc(2026, 3, 4, 21, 30)), "2026-03-04T21:30:00+00:00");
    let with_micros = utc(2026, 3, 4, 21, 30) + chrono::Duration::microseconds(123);
    assert_eq!(iso_utc(&with_micros), "2026-03-04T21:30:00.000123+00:00");
}

#[test]
fn lenient_timestamp_parsing() {
    let expected = utc(2026, 3, 2, 1, 15);
    assert_eq!(parse_timestamp("2026-03-02T01:15:00+00:00"), Some(expected));
    assert_eq!(parse_timestamp("2026-03-01T17:15:00-08:00"), Some(expected));
    assert_eq!(parse_timestamp("2026-03-02 01:15:00"), Some(expected));
    assert_eq!(parse_timestamp("2026-03-02"), Some(utc(2026, 3, 2, 0, 0)));
    assert_eq!(parse_timestamp("last tuesday"), None);
}
