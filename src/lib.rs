//! Locale-sensitive date/time parsing for ICU-style letter patterns.
//!
//! A pattern string such as `"yyyy.MM.dd 'at' HH:mm:ss"` is compiled once
//! into a list of parse elements; each call to [`DateTimeParser::parse`]
//! then walks an input string against that list, accumulates the fields it
//! finds, and folds them into a caller-supplied date value.
//!
//! ```
//! use chrono::NaiveDate;
//! use datepattern::{parse_into, Moment};
//!
//! let start = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let mut date = Moment::new(start);
//! let consumed = parse_into("yyyy.MM.dd", "1996.07.10", &mut date);
//! assert_eq!(consumed, 10);
//! assert_eq!(date.naive().date(), NaiveDate::from_ymd_opt(1996, 7, 10).unwrap());
//! ```

#[macro_use]
mod macros;
mod api;
mod engine;
mod moment;
mod symbols;

pub use api::{parse_into, Context, DateTimeParser, ElementSummary, Options};
pub use moment::{DateLike, Moment};
pub use symbols::DateTimeSymbols;

// --- Internal types ---------------------------------------------------------

/// One compiled element of a pattern string.
///
/// The compiler partitions the pattern exactly into these; nothing is lost
/// or duplicated, so the element list is the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatternItem {
    /// Verbatim text that must appear in the input (case-sensitive).
    Literal(String),
    /// One or more whitespace characters in the input.
    Whitespace,
    /// A run of a single pattern letter, e.g. `HH` or `MMMM`.
    Field(FieldSpec),
}

/// A pattern-letter run: the letter, how many times it repeats, whether it
/// parses as digits, and whether it heads an abutting numeric run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldSpec {
    pub letter: char,
    pub count: usize,
    pub numeric: bool,
    /// True when this numeric field is directly followed by another numeric
    /// field with no separator in between. Only the head of such a run is
    /// marked; its width shrinks during the retry loop while the rest stay
    /// fixed at their letter counts.
    pub abut_start: bool,
}

/// Fields accumulated while matching input against the element list.
///
/// Every attribute is optional; resolution distinguishes "parsed as zero"
/// from "never seen". `ambiguous_year` flags the single two-digit year that
/// sits exactly on the century-window boundary.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedFields {
    pub era: Option<i32>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub hours: Option<i32>,
    pub minutes: Option<i32>,
    pub seconds: Option<i32>,
    pub millis: Option<i32>,
    pub ampm: Option<i32>,
    /// Minutes west of UTC (opposite sign of the spelled offset), matching
    /// the convention of [`DateLike::timezone_offset`].
    pub tz_offset: Option<i32>,
    pub day_of_week: Option<i32>,
    pub ambiguous_year: bool,
}
