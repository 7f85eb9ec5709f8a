//! # Clock
//!
//! Source of "now" for everything time-dependent in the app layer: the
//! local calendar day of summaries and the daily-limit alert, and the UTC
//! instants of lockouts and license validity.
//!
//! Tests inject a [`ManualClock`] to cross lockout and expiry boundaries
//! without sleeping.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, Utc};
use std::fmt::Debug;
use std::sync::Mutex;

pub trait Clock: Send + Sync + Debug {
    /// Current instant.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current wall-clock time in the device's time zone.
    fn now_local(&self) -> NaiveDateTime;

    /// Local calendar date.
    fn today(&self) -> NaiveDate {
        self.now_local().date()
    }
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock. Local time is the UTC time without offset.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(now),
        }
    }

    /// Clock set to `local` (read as UTC).
    pub fn at(local: NaiveDateTime) -> Self {
        ManualClock::new(local.and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now_local(&self) -> NaiveDateTime {
        self.now_utc().naive_utc()
    }
}
