//! Calendar date source
//!
//! The date is the only input of the schedule that changes between
//! invocations. It is injected through [`DateClock`] so the schedule of any
//! day can be computed without touching the system time.

use chrono::{Datelike, Local, NaiveDate};

/// Days between 0001-01-01 and 1970-01-01 in the proleptic Gregorian calendar
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Source of "today"
pub trait DateClock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl DateClock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl DateClock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Whole days elapsed since 1970-01-01 (negative before it)
///
/// Counts calendar days of `date` as given, so with [`SystemClock`] the
/// count follows the host's local calendar rather than UTC.
pub fn day_index(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

/// Position of `date` in a cycle of `cycle_len` turns
///
/// Returns `None` for an empty cycle.
pub fn cycle_index(date: NaiveDate, cycle_len: usize) -> Option<usize> {
    if cycle_len == 0 {
        return None;
    }
    let len = i64::try_from(cycle_len).ok()?;
    usize::try_from(day_index(date).rem_euclid(len)).ok()
}
