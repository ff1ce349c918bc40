//! Scheduling anchors, training-time synthesis and dual-zone rendering.
//!
//! Two zones are in play and they are NOT interchangeable:
//!   - UTC: every persisted timestamp (assignment dates, completion times)
//!     and the weekday used for the weekly anchors.
//!   - America/Los_Angeles (DISPLAY_TZ): the calendar date a human would
//!     see. It drives file names, request ids, the recency "today" and
//!     the 13:15/13:19 training slot.
//!
//! Near midnight UTC the two zones disagree about the date; downstream
//! consumers parse both, so neither may be "simplified" into the other.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const DISPLAY_TZ: Tz = chrono_tz::America::Los_Angeles;

pub const START_ANCHOR_HM: (u32, u32) = (1, 15);
pub const DUE_ANCHOR_HM: (u32, u32) = (1, 3);
pub const TRAINING_START_HM: (u32, u32) = (13, 15);
pub const TRAINING_END_HM: (u32, u32) = (13, 19);

fn at(date: NaiveDate, (hour, minute): (u32, u32)) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, 0)
        .expect("anchor hour/minute constants are in range")
}

// ── Weekly anchors ────────────────────────────────────────────────

/// Most recent Monday (today if today is Monday, judged in UTC) at 01:15 UTC.
///
/// Historically this helper was named after Sunday. The computed day has
/// always been Monday and that is what downstream files carry.
pub fn week_start_anchor(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_since_monday = i64::from(now.weekday().num_days_from_monday());
    let monday = now.date_naive() - Duration::days(days_since_monday);
    Utc.from_utc_datetime(&at(monday, START_ANCHOR_HM))
}

/// The Monday after `week_start_anchor`, at 01:03 UTC.
pub fn week_due_anchor(now: DateTime<Utc>) -> DateTime<Utc> {
    let next_monday = week_start_anchor(now).date_naive() + Duration::days(7);
    Utc.from_utc_datetime(&at(next_monday, DUE_ANCHOR_HM))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingWindow {
    pub start: DateTime<Utc>,
    pub due: DateTime<Utc>,
}

impl SchedulingWindow {
    pub fn for_week_of(now: DateTime<Utc>) -> Self {
        Self {
            start: week_start_anchor(now),
            due: week_due_anchor(now),
        }
    }
}

// ── Run stamp ─────────────────────────────────────────────────────

/// Everything time-derived that must be identical across one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStamp {
    pub captured_at: DateTime<Utc>,
    pub local: DateTime<Tz>,
    pub request_id: String,
    pub window: SchedulingWindow,
}

impl RunStamp {
    pub fn capture(now: DateTime<Utc>) -> Self {
        Self {
            captured_at: now,
            local: now.with_timezone(&DISPLAY_TZ),
            request_id: request_id_for(now),
            window: SchedulingWindow::for_week_of(now),
        }
    }

    /// Calendar date in the display zone.
    pub fn local_date(&self) -> NaiveDate {
        self.local.date_naive()
    }

    /// `HHMMSS` in the display zone, as embedded in file names.
    pub fn local_hms(&self) -> String {
        format!(
            "{:02}{:02}{:02}",
            self.local.hour(),
            self.local.minute(),
            self.local.second()
        )
    }
}

/// `fake:DD`, day of month in the display zone, zero-padded.
pub fn request_id_for(now: DateTime<Utc>) -> String {
    format!("fake:{:02}", now.with_timezone(&DISPLAY_TZ).day())
}

// ── Training times ────────────────────────────────────────────────

/// The (start, completion) pair stamped on every record of one resolver
/// invocation: 13:15 and 13:19 on the display-zone date, stored as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingTimes {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl TrainingTimes {
    pub fn for_snapshot(now: DateTime<Utc>) -> Self {
        let local_date = now.with_timezone(&DISPLAY_TZ).date_naive();
        Self {
            started_at: display_local_to_utc(local_date, TRAINING_START_HM),
            completed_at: display_local_to_utc(local_date, TRAINING_END_HM),
        }
    }
}

fn display_local_to_utc(date: NaiveDate, hm: (u32, u32)) -> DateTime<Utc> {
    let naive = at(date, hm);
    DISPLAY_TZ
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        // Early afternoon never falls in a DST gap; keep a total function anyway.
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

// ── Recency window ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Trailing window of `days` calendar days ending today, inclusive.
pub fn recency_range(now: DateTime<Utc>, days: u32) -> DateRange {
    let today = now.with_timezone(&DISPLAY_TZ).date_naive();
    let span = i64::from(days.max(1)) - 1;
    DateRange {
        start: today - Duration::days(span),
        end: today,
    }
}

// ── Rendering ─────────────────────────────────────────────────────

/// `YYYY-MM-DDTHH:MM:SS[.ffffff]+00:00`, the layout every downstream
/// parser was written against.
pub fn iso_utc(ts: &DateTime<Utc>) -> String {
    let micros = ts.timestamp_subsec_micros();
    if micros == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
    } else {
        format!("{}.{micros:06}+00:00", ts.format("%Y-%m-%dT%H:%M:%S"))
    }
}

/// Lenient timestamp parsing for imported rows: RFC 3339, naive
/// date-time (taken as UTC) or a bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| Utc.from_utc_datetime(&at(d, (0, 0))))
}
