//! The mutable date value the parser writes into.
//!
//! The engine only ever touches a date through the [`DateLike`] contract:
//! a handful of field getters, field setters that roll over out-of-range
//! values into neighboring months/days (so resolution's month/day dance and
//! day-of-week nudges behave), and an epoch-milliseconds view for timezone
//! shifts. [`Moment`] is the built-in chrono-backed implementation.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Field-level access to a mutable date/time value.
///
/// Conventions follow the host-date model the parser was written against:
/// months are zero-based, day-of-week counts from Sunday, and
/// `timezone_offset` is the number of minutes local time lags UTC (positive
/// west of Greenwich).
///
/// Setters accept out-of-range values and roll them over: setting day 30 in
/// February lands in early March, setting hour 25 advances a day, setting
/// day 0 backs into the previous month.
pub trait DateLike {
    fn year(&self) -> i32;
    /// Zero-based month (0 = January).
    fn month(&self) -> i32;
    /// One-based day of month.
    fn day(&self) -> i32;
    fn hours(&self) -> i32;
    /// Day of week, 0 = Sunday.
    fn day_of_week(&self) -> i32;
    /// Minutes local time lags UTC.
    fn timezone_offset(&self) -> i32;
    fn timestamp_millis(&self) -> i64;
    /// Whether time-of-day setters apply. Date-only values return false and
    /// the parser skips every time field for them.
    fn supports_time(&self) -> bool {
        true
    }

    fn set_year(&mut self, year: i32);
    fn set_month(&mut self, month: i32);
    fn set_day(&mut self, day: i32);
    fn set_hours(&mut self, hours: i32);
    fn set_minutes(&mut self, minutes: i32);
    fn set_seconds(&mut self, seconds: i32);
    fn set_milliseconds(&mut self, millis: i32);
    fn set_timestamp_millis(&mut self, millis: i64);
}

/// A concrete calendar instant: a naive local datetime plus a fixed
/// timezone offset (minutes local lags UTC) and a date-only marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    local: NaiveDateTime,
    tz_offset: i32,
    date_only: bool,
}

impl Moment {
    /// A moment at UTC (offset zero).
    pub fn new(local: NaiveDateTime) -> Self {
        Moment { local, tz_offset: 0, date_only: false }
    }

    /// A moment in a fixed zone; `tz_offset` is minutes local lags UTC,
    /// e.g. 480 for UTC-8.
    pub fn with_offset(local: NaiveDateTime, tz_offset: i32) -> Self {
        Moment { local, tz_offset, date_only: false }
    }

    /// A date without a time of day; the parser will leave hour, minute,
    /// second and millisecond fields untouched.
    pub fn date_only(date: NaiveDate) -> Self {
        Moment { local: NaiveDateTime::new(date, NaiveTime::MIN), tz_offset: 0, date_only: true }
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.local
    }

    /// Rebuild the date part, letting an out-of-range day spill into the
    /// next or previous month the way the first-of-month anchor dictates.
    fn rebuild(&mut self, year: i32, month: i32, day: i64) {
        let y = year + month.div_euclid(12);
        let m = month.rem_euclid(12) as u32 + 1;
        let date = NaiveDate::from_ymd_opt(y, m, 1).and_then(|first| first.checked_add_signed(Duration::days(day - 1)));
        if let Some(date) = date {
            self.local = NaiveDateTime::new(date, self.local.time());
        }
    }

    fn shift(&mut self, delta: Duration) {
        if let Some(local) = self.local.checked_add_signed(delta) {
            self.local = local;
        }
    }
}

impl DateLike for Moment {
    fn year(&self) -> i32 {
        self.local.year()
    }

    fn month(&self) -> i32 {
        self.local.month0() as i32
    }

    fn day(&self) -> i32 {
        self.local.day() as i32
    }

    fn hours(&self) -> i32 {
        self.local.hour() as i32
    }

    fn day_of_week(&self) -> i32 {
        self.local.weekday().num_days_from_sunday() as i32
    }

    fn timezone_offset(&self) -> i32 {
        self.tz_offset
    }

    fn timestamp_millis(&self) -> i64 {
        (self.local + Duration::minutes(i64::from(self.tz_offset))).and_utc().timestamp_millis()
    }

    fn supports_time(&self) -> bool {
        !self.date_only
    }

    fn set_year(&mut self, year: i32) {
        self.rebuild(year, self.month(), i64::from(self.day()));
    }

    fn set_month(&mut self, month: i32) {
        self.rebuild(self.year(), month, i64::from(self.day()));
    }

    fn set_day(&mut self, day: i32) {
        self.rebuild(self.year(), self.month(), i64::from(day));
    }

    fn set_hours(&mut self, hours: i32) {
        self.shift(Duration::hours(i64::from(hours - self.hours())));
    }

    fn set_minutes(&mut self, minutes: i32) {
        self.shift(Duration::minutes(i64::from(minutes) - i64::from(self.local.minute())));
    }

    fn set_seconds(&mut self, seconds: i32) {
        self.shift(Duration::seconds(i64::from(seconds) - i64::from(self.local.second())));
    }

    fn set_milliseconds(&mut self, millis: i32) {
        let current = i64::from(self.local.nanosecond() / 1_000_000);
        self.shift(Duration::milliseconds(i64::from(millis) - current));
    }

    fn set_timestamp_millis(&mut self, millis: i64) {
        if let Some(utc) = DateTime::from_timestamp_millis(millis) {
            self.local = utc.naive_utc() - Duration::minutes(i64::from(self.tz_offset));
        }
    }
}
