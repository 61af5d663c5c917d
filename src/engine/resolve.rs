//! Field resolution.
//!
//! Matching produces a [`ParsedFields`] record, which is an intermediate
//! parse result: a bag of optional field values. Resolution turns that bag
//! into a concrete date by folding it into the caller's value, in a fixed
//! and observable order:
//!
//! ```text
//! ParsedFields ──▶ era/year ──▶ month/day ──▶ time of day
//!                     │                            │
//!                     │        (validate?) ◀───────┘
//!                     ▼
//!              timezone shift ──▶ ambiguous-year fixup ──▶ weekday
//! ```
//!
//! The month/day dance matters: the day is pinned to 1 before the month is
//! set so a pre-existing day 31 cannot roll an intermediate February into
//! March, and only afterwards is the day written (or the old day clamped to
//! the new month's length).
//!
//! Failure leaves the value as the caller handed it in; the engine works on
//! a scratch copy and commits only on success (see `api.rs`).

use chrono::{Months, NaiveDate};

use crate::api::Context;
use crate::moment::DateLike;
use crate::ParsedFields;

/// Fold `fields` into `date`. Returns false when validation or the weekday
/// cross-check rejects the combination.
pub(crate) fn resolve<D: DateLike>(fields: &ParsedFields, date: &mut D, validate: bool, context: &Context) -> bool {
    // Era 0 counts backwards from 1 BCE.
    let mut year = fields.year;
    if fields.era == Some(0) {
        if let Some(y) = fields.year {
            if y > 0 {
                year = Some(-(y - 1));
            }
        }
    }
    if let Some(y) = year {
        date.set_year(y);
    }

    // Pin the day to 1 while the month moves, then restore or clamp.
    let previous_day = date.day();
    date.set_day(1);
    if let Some(m) = fields.month {
        date.set_month(m);
    }
    match fields.day {
        Some(d) => date.set_day(d),
        None => date.set_day(previous_day.min(days_in_month(date.year(), date.month()))),
    }

    if date.supports_time() {
        let mut hours = fields.hours.unwrap_or_else(|| date.hours());
        if fields.ampm.is_some_and(|v| v > 0) && hours < 12 {
            hours += 12;
        }
        date.set_hours(hours);
        if let Some(m) = fields.minutes {
            date.set_minutes(m);
        }
        if let Some(s) = fields.seconds {
            date.set_seconds(s);
        }
        if let Some(ms) = fields.millis {
            date.set_milliseconds(ms);
        }
    }

    if validate && !round_trips(fields, year, date) {
        return false;
    }

    if let Some(tz) = fields.tz_offset {
        let delta = i64::from(tz - date.timezone_offset()) * 60_000;
        date.set_timestamp_millis(date.timestamp_millis() + delta);
    }

    // A two-digit year that sat exactly on the window cutoff resolved to the
    // early century; push it forward when the result fell out of the window.
    if fields.ambiguous_year && fields.year.is_some() {
        if let Some(start) = century_window_start(context) {
            if date.timestamp_millis() < start {
                date.set_year(date.year() + 100);
            }
        }
    }

    if let Some(dow) = fields.day_of_week {
        if fields.day.is_none() {
            // Nudge to the nearest matching weekday, preferring the earlier
            // one on a 4-day tie, without leaving the month.
            let mut adjustment = (7 + dow - date.day_of_week()) % 7;
            if adjustment > 3 {
                adjustment -= 7;
            }
            let month = date.month();
            date.set_day(date.day() + adjustment);
            if date.month() != month {
                date.set_day(date.day() + if adjustment > 0 { -7 } else { 7 });
            }
        } else if dow != date.day_of_week() {
            return false;
        }
    }

    true
}

/// Strict check: the explicit fields must have survived the calendar
/// arithmetic unchanged, and the time-of-day fields must be in range.
fn round_trips<D: DateLike>(fields: &ParsedFields, year: Option<i32>, date: &D) -> bool {
    if year.is_some_and(|y| y != date.year()) {
        return false;
    }
    if fields.month.is_some_and(|m| m != date.month()) {
        return false;
    }
    if fields.day.is_some_and(|d| d != date.day()) {
        return false;
    }
    if fields.hours.is_some_and(|h| h >= 24) {
        return false;
    }
    if fields.minutes.is_some_and(|m| m >= 60) {
        return false;
    }
    if fields.seconds.is_some_and(|s| s >= 60) {
        return false;
    }
    if fields.millis.is_some_and(|ms| ms >= 1000) {
        return false;
    }
    true
}

/// Epoch milliseconds of `now` minus the century window, the instant the
/// two-digit-year window opens.
fn century_window_start(context: &Context) -> Option<i64> {
    let years = u32::try_from(context.century_window).ok()?;
    let start = context.now.checked_sub_months(Months::new(years * 12))?;
    Some(start.and_utc().timestamp_millis())
}

fn days_in_month(year: i32, month: i32) -> i32 {
    let y = year + month.div_euclid(12);
    let m = month.rem_euclid(12) as u32 + 1;
    let first = NaiveDate::from_ymd_opt(y, m, 1);
    let next = if m == 12 { NaiveDate::from_ymd_opt(y + 1, 1, 1) } else { NaiveDate::from_ymd_opt(y, m + 1, 1) };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as i32,
        _ => 31,
    }
}
