//! Wall clock: the single place the core learns "now".
//!
//! RULE: No module calls `Utc::now()` directly. Everything that depends
//! on the current time takes a snapshot from a WallClock, so a run (and
//! every test) can pin time to an exact instant.

use chrono::{DateTime, Utc};

pub trait WallClock: Send {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant. Used by tests and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl WallClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl FixedClock {
    /// Wednesday 2026-03-04 21:30 UTC, 13:30 PST the same day. Single-digit
    /// month and day, so file-name padding differences are visible.
    pub fn reference() -> Self {
        use chrono::TimeZone;
        Self(
            Utc.with_ymd_and_hms(2026, 3, 4, 21, 30, 0)
                .single()
                .expect("reference instant is a valid UTC time"),
        )
    }
}
