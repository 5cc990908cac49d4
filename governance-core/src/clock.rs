//! Injectable clock, so rate-limit and validity-window arithmetic can be
//! exercised deterministically in tests without sleeping real time.

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;

/// Source of wall-clock time used by the resolver, validator, and enforcement
/// engine. Production code uses [`SystemClock`]; tests use [`FixedClock`].
pub trait Clock: Send + Sync {
    /// Current time in epoch milliseconds (used for rate-limit windows).
    fn now_ms(&self) -> i64;

    /// Current UTC instant (used for `validFrom`/`validUntil` comparisons).
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current local hour (0-23) and weekday (0-6, Sunday = 0), used for
    /// `allowedHours`/`allowedDays`. Per spec these are evaluated against the
    /// engine's local wall clock, deliberately distinct from `now_utc`.
    fn local_hour_and_weekday(&self) -> (u32, u32);
}

/// Real wall-clock time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_hour_and_weekday(&self) -> (u32, u32) {
        let now = Local::now();
        use chrono::{Datelike, Timelike};
        (now.hour(), now.weekday().num_days_from_sunday())
    }
}

/// A fixed instant in time, for deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    pub ms: i64,
    pub utc: DateTime<Utc>,
    pub hour: u32,
    pub weekday: u32,
}

impl FixedClock {
    pub fn new(utc: DateTime<Utc>) -> Self {
        use chrono::{Datelike, Timelike};
        Self {
            ms: utc.timestamp_millis(),
            utc,
            hour: utc.hour(),
            weekday: utc.weekday().num_days_from_sunday(),
        }
    }

    pub fn with_local(mut self, hour: u32, weekday: u32) -> Self {
        self.hour = hour;
        self.weekday = weekday;
        self
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.ms
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.utc
    }

    fn local_hour_and_weekday(&self) -> (u32, u32) {
        (self.hour, self.weekday)
    }
}

pub type SharedClock = Arc<dyn Clock>;

pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}
