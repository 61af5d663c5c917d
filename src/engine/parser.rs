//! Element-driven matching.
//!
//! This module is the operational core of the engine: it walks the compiled
//! element list against the input, left to right, with a single shared
//! position.
//!
//! ```text
//! [Lit] [Ws] [Field] [Field* Field Field] [Field]
//!   │     │     │       └─ abutting run: retry loop, shrinking head width
//!   │     │     └─ per-letter sub-parser, no width cap
//!   │     └─ \s+ (at least one character)
//!   └─ byte-exact match
//! ```
//!
//! Field values land in a [`ParsedFields`] record; turning that record into
//! a concrete date happens afterwards in `resolve.rs`.
//!
//! ## Abutting runs
//!
//! Runs of numeric fields with no separator (`HHmmss`) are ambiguous: the
//! input `"12345"` could split many ways. The retry loop gives the head
//! field its declared width first and shrinks it by one on every failed
//! pass; the other fields of the run must consume exactly their declared
//! widths. The first decomposition where every trailing field fits wins.
//!
//! ## Debugging
//!
//! Set `DATEPATTERN_DEBUG=1` to print retry and failure traces.

use std::borrow::Cow;

use chrono::Datelike;

use crate::api::Context;
use crate::symbols::{self, DateTimeSymbols};
use crate::{FieldSpec, ParsedFields, PatternItem};

fn debug() -> bool {
    std::env::var_os("DATEPATTERN_DEBUG").is_some()
}

/// Matches one input string against one compiled element list.
///
/// Create with [`Parser::new`], call [`Parser::run`], then read `fields`.
pub(crate) struct Parser<'a> {
    input: &'a str,
    items: &'a [PatternItem],
    symbols: &'a DateTimeSymbols,
    context: &'a Context,
    pos: usize,
    pub(crate) fields: ParsedFields,
}

impl<'a> Parser<'a> {
    pub fn new(
        input: &'a str,
        items: &'a [PatternItem],
        symbols: &'a DateTimeSymbols,
        context: &'a Context,
    ) -> Self {
        Parser { input, items, symbols, context, pos: 0, fields: ParsedFields::default() }
    }

    /// Walk every element. Returns the final byte position on success.
    pub fn run(&mut self) -> Option<usize> {
        let mut i = 0;
        while i < self.items.len() {
            match &self.items[i] {
                PatternItem::Literal(text) => {
                    if !self.match_literal(text) {
                        if debug() {
                            eprintln!("[parse] literal {:?} missing at byte {}", text, self.pos);
                        }
                        return None;
                    }
                    i += 1;
                }
                PatternItem::Whitespace => {
                    if !self.match_whitespace() {
                        if debug() {
                            eprintln!("[parse] whitespace required at byte {}", self.pos);
                        }
                        return None;
                    }
                    i += 1;
                }
                PatternItem::Field(f) if f.abut_start => {
                    let consumed = self.parse_abutting(i)?;
                    i += consumed;
                }
                PatternItem::Field(f) => {
                    let f = *f;
                    if !self.sub_parse(f, 0) {
                        if debug() {
                            eprintln!("[parse] field '{}' failed at byte {}", f.letter, self.pos);
                        }
                        return None;
                    }
                    i += 1;
                }
            }
        }
        Some(self.pos)
    }

    /// Resolve an abutting numeric run headed at `head`.
    ///
    /// Returns the number of elements the run covered. Every element parses
    /// at a fixed width; only the head shrinks, one character per pass, and
    /// a pass that fails anywhere rewinds the input to the start of the run.
    fn parse_abutting(&mut self, head: usize) -> Option<usize> {
        let entry = self.pos;
        let mut abut_pass = 0;
        let mut i = head;
        while i < self.items.len() {
            let field = match &self.items[i] {
                PatternItem::Field(f) if f.numeric => *f,
                // Anything else, textual fields included, ends the run.
                _ => break,
            };
            let mut width = field.count;
            if i == head {
                width = width.saturating_sub(abut_pass);
                abut_pass += 1;
                if width == 0 {
                    if debug() {
                        eprintln!("[parse] abutting run at element {} exhausted every head width", head);
                    }
                    return None;
                }
            }
            if self.sub_parse(field, width) {
                i += 1;
            } else {
                if debug() {
                    eprintln!("[parse] abutting retry at element {}, rewinding to byte {}", i, entry);
                }
                self.pos = entry;
                i = head;
            }
        }
        Some(i - head)
    }

    /// Dispatch one field element. `digit_count` caps how many characters a
    /// numeric sub-parser may consume; zero means uncapped.
    fn sub_parse(&mut self, field: FieldSpec, digit_count: usize) -> bool {
        self.skip_whitespace();
        match field.letter {
            'G' => {
                let s = self.symbols;
                if let Some(idx) = self.match_symbol(s.eras.iter().copied()) {
                    self.fields.era = Some(idx as i32);
                }
                // A missing era is not an error; the field just stays unset.
                true
            }
            'M' | 'L' => self.sub_parse_month(field, digit_count),
            'E' => self.sub_parse_weekday(),
            'a' => {
                let s = self.symbols;
                if let Some(idx) = self.match_symbol(s.ampms.iter().copied()) {
                    self.fields.ampm = Some(idx as i32);
                }
                true
            }
            'y' => self.sub_parse_year(field, digit_count),
            'Q' => self.sub_parse_quarter(),
            'd' => {
                if let Some(value) = self.parse_field_int(digit_count) {
                    self.fields.day = Some(value as i32);
                }
                true
            }
            'S' => self.sub_parse_fraction(digit_count),
            'h' => match self.parse_field_int(digit_count) {
                Some(value) => {
                    // Noon and midnight are spelled 12; fold to 0 and let the
                    // AM/PM marker add the afternoon back during resolution.
                    self.fields.hours = Some(if value == 12 { 0 } else { value as i32 });
                    true
                }
                None => false,
            },
            'K' | 'H' | 'k' => match self.parse_field_int(digit_count) {
                Some(value) => {
                    self.fields.hours = Some(value as i32);
                    true
                }
                None => false,
            },
            'm' => match self.parse_field_int(digit_count) {
                Some(value) => {
                    self.fields.minutes = Some(value as i32);
                    true
                }
                None => false,
            },
            's' => match self.parse_field_int(digit_count) {
                Some(value) => {
                    self.fields.seconds = Some(value as i32);
                    true
                }
                None => false,
            },
            'z' | 'Z' | 'v' => self.sub_parse_timezone(),
            // 'D' and anything unrecognized has no sub-parser.
            _ => false,
        }
    }

    fn sub_parse_month(&mut self, field: FieldSpec, digit_count: usize) -> bool {
        if field.numeric {
            match self.parse_field_int(digit_count) {
                Some(value) => {
                    self.fields.month = Some(value as i32 - 1);
                    true
                }
                None => false,
            }
        } else {
            let s = self.symbols;
            let candidates = s
                .months
                .iter()
                .chain(s.standalone_months)
                .chain(s.short_months)
                .chain(s.standalone_short_months)
                .copied();
            match self.match_symbol(candidates) {
                Some(idx) => {
                    self.fields.month = Some((idx % 12) as i32);
                    true
                }
                None => false,
            }
        }
    }

    fn sub_parse_weekday(&mut self) -> bool {
        let s = self.symbols;
        let idx = self
            .match_symbol(s.weekdays.iter().copied())
            .or_else(|| self.match_symbol(s.short_weekdays.iter().copied()));
        match idx {
            Some(i) => {
                self.fields.day_of_week = Some(i as i32);
                true
            }
            None => false,
        }
    }

    fn sub_parse_quarter(&mut self) -> bool {
        let s = self.symbols;
        let idx = self
            .match_symbol(s.quarters.iter().copied())
            .or_else(|| self.match_symbol(s.short_quarters.iter().copied()));
        match idx {
            Some(i) => {
                self.fields.month = Some(i as i32 * 3);
                self.fields.day = Some(1);
                true
            }
            None => false,
        }
    }

    fn sub_parse_year(&mut self, field: FieldSpec, digit_count: usize) -> bool {
        let start = self.pos;
        let mut value = self.parse_field_int(digit_count);
        if value.is_none() {
            // Signed fallback for explicit "+" / "-" years. The width cap is
            // intentionally not reapplied here.
            value = self.parse_int(0, true);
        }
        let Some(value) = value else { return false };
        let consumed = self.input[start..self.pos].chars().count();
        if value >= 0 && consumed == 2 && field.count == 2 {
            self.set_two_digit_year(value as i32);
        } else {
            self.fields.year = Some(value as i32);
        }
        true
    }

    /// Pin a two-digit year inside the moving century window: the hundred
    /// years starting `century_window` years before now.
    fn set_two_digit_year(&mut self, value: i32) {
        let century_start = self.context.now.year() - self.context.century_window;
        let cutoff = century_start % 100;
        self.fields.ambiguous_year = value == cutoff;
        let mut year = century_start / 100 * 100 + value;
        if value < cutoff {
            year += 100;
        }
        self.fields.year = Some(year);
    }

    fn sub_parse_fraction(&mut self, digit_count: usize) -> bool {
        let start = self.pos;
        let Some(value) = self.parse_field_int(digit_count) else { return false };
        let len = self.input[start..self.pos].chars().count();
        // Left-justify to milliseconds: ".4" is 400ms, ".123456" rounds to
        // 123ms.
        let millis = if len < 3 {
            value * 10_i64.pow((3 - len) as u32)
        } else if len > 3 {
            let divisor = 10_i64.pow((len - 3) as u32);
            (value + divisor / 2) / divisor
        } else {
            value
        };
        self.fields.millis = Some(millis as i32);
        true
    }

    /// GMT-relative timezone: `GMT`, `GMT±hh[:mm]`, `±hh[:mm]`, `±hhmm`.
    fn sub_parse_timezone(&mut self) -> bool {
        if self.input[self.pos..].starts_with("GMT") {
            self.pos += 3;
        }
        if self.pos >= self.input.len() {
            self.fields.tz_offset = Some(0);
            return true;
        }
        let start = self.pos;
        let Some(first) = self.parse_int(0, true) else { return false };
        let offset = if self.input[self.pos..].starts_with(':') {
            self.pos += 1;
            let Some(second) = self.parse_int(0, false) else { return false };
            first * 60 + second
        } else {
            let consumed = self.input[start..self.pos].chars().count();
            if first < 24 && consumed <= 3 {
                // Short form: hours only.
                first * 60
            } else {
                // Packed hhmm. The minutes part is taken as-is, unchecked.
                first % 100 + first / 100 * 60
            }
        };
        // Captured as minutes west of UTC, the opposite sign of the spelling.
        self.fields.tz_offset = Some(-offset as i32);
        true
    }

    // --- Matching primitives -------------------------------------------------

    fn match_literal(&mut self, text: &str) -> bool {
        if self.input[self.pos..].starts_with(text) {
            self.pos += text.len();
            true
        } else {
            false
        }
    }

    fn match_whitespace(&mut self) -> bool {
        match regex!(r"^\s+").find(&self.input[self.pos..]) {
            Some(m) => {
                self.pos += m.end();
                true
            }
            None => false,
        }
    }

    fn skip_whitespace(&mut self) {
        if let Some(m) = regex!(r"^\s+").find(&self.input[self.pos..]) {
            self.pos += m.end();
        }
    }

    fn match_symbol<I>(&mut self, candidates: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'static str>,
    {
        let rest: &'a str = &self.input[self.pos..];
        let (idx, len) = symbols::longest_match(candidates, rest)?;
        self.pos += len;
        Some(idx)
    }

    /// Parse digits, requiring exactly `digit_count` of them when a cap is
    /// in force (abutting runs give every element a fixed width).
    fn parse_field_int(&mut self, digit_count: usize) -> Option<i64> {
        let start = self.pos;
        let value = self.parse_int(digit_count, false)?;
        if digit_count > 0 && self.input[start..self.pos].chars().count() != digit_count {
            self.pos = start;
            return None;
        }
        Some(value)
    }

    /// The integer-parsing primitive: optional sign when `allow_signed`,
    /// then one or more digits, reading at most `max_chars` characters when
    /// the cap is positive. Locale digits are mapped to ASCII before the
    /// match when the symbol table carries a native zero.
    fn parse_int(&mut self, max_chars: usize, allow_signed: bool) -> Option<i64> {
        let rest = &self.input[self.pos..];
        let mapped = self.map_native_digits(rest);
        let limited: &str = if max_chars > 0 {
            match mapped.char_indices().nth(max_chars) {
                Some((end, _)) => &mapped[..end],
                None => &mapped,
            }
        } else {
            &mapped
        };
        let re = if allow_signed { regex!(r"^[+-]?\d+") } else { regex!(r"^\d+") };
        let m = re.find(limited)?;
        let value: i64 = m.as_str().parse().ok()?;
        let chars = m.as_str().chars().count();
        self.pos += byte_len_of_chars(rest, chars);
        Some(value)
    }

    /// Replace the locale's digits with ASCII digits so the numeric regexes
    /// apply. The mapping is per-character over the whole remainder.
    fn map_native_digits<'s>(&self, rest: &'s str) -> Cow<'s, str> {
        match self.symbols.zero_digit {
            Some(zero) if zero != '0' => {
                let base = zero as u32;
                Cow::Owned(
                    rest.chars()
                        .map(|c| {
                            let d = (c as u32).wrapping_sub(base);
                            if d <= 9 {
                                char::from_u32('0' as u32 + d).unwrap_or(c)
                            } else {
                                c
                            }
                        })
                        .collect(),
                )
            }
            _ => Cow::Borrowed(rest),
        }
    }
}

fn byte_len_of_chars(text: &str, chars: usize) -> usize {
    match text.char_indices().nth(chars) {
        Some((i, _)) => i,
        None => text.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compiler::compile;
    use crate::symbols::EN;

    fn run(pattern: &str, input: &str) -> Option<(usize, ParsedFields)> {
        run_with_symbols(pattern, input, &EN)
    }

    fn run_with_symbols(
        pattern: &str,
        input: &str,
        symbols: &DateTimeSymbols,
    ) -> Option<(usize, ParsedFields)> {
        let items = compile(pattern);
        let context = Context::default();
        let mut parser = Parser::new(input, &items, symbols, &context);
        let consumed = parser.run()?;
        Some((consumed, parser.fields.clone()))
    }

    #[test]
    fn abutting_run_takes_full_widths_first() {
        let (consumed, fields) = run("HHmmss", "123456").unwrap();
        assert_eq!(consumed, 6);
        assert_eq!(fields.hours, Some(12));
        assert_eq!(fields.minutes, Some(34));
        assert_eq!(fields.seconds, Some(56));
    }

    #[test]
    fn abutting_run_shrinks_the_head_until_the_tail_fits() {
        let (consumed, fields) = run("HHmmss", "12345").unwrap();
        assert_eq!(consumed, 5);
        assert_eq!(fields.hours, Some(1));
        assert_eq!(fields.minutes, Some(23));
        assert_eq!(fields.seconds, Some(45));
    }

    #[test]
    fn abutting_run_fails_when_no_head_width_works() {
        assert!(run("HHmmss", "1234").is_none());
    }

    #[test]
    fn abutting_run_leaves_trailing_digits_alone() {
        let (consumed, fields) = run("HHmmss", "1234567").unwrap();
        assert_eq!(consumed, 6);
        assert_eq!(fields.seconds, Some(56));
    }

    #[test]
    fn abutting_date_run() {
        let (consumed, fields) = run("yyyyMMdd", "19960710").unwrap();
        assert_eq!(consumed, 8);
        assert_eq!(fields.year, Some(1996));
        assert_eq!(fields.month, Some(6));
        assert_eq!(fields.day, Some(10));
    }

    #[test]
    fn uncapped_numeric_fields_stop_at_non_digits() {
        let (consumed, fields) = run("H:m", "7:5").unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(fields.hours, Some(7));
        assert_eq!(fields.minutes, Some(5));
    }

    #[test]
    fn two_digit_year_lands_in_the_century_window() {
        // The test context pins "now" to 1997, so the window is 1917..2016.
        let (_, fields) = run("yy", "12").unwrap();
        assert_eq!(fields.year, Some(2012));
        assert!(!fields.ambiguous_year);

        let (_, fields) = run("yy", "64").unwrap();
        assert_eq!(fields.year, Some(1964));

        let (_, fields) = run("yy", "17").unwrap();
        assert_eq!(fields.year, Some(1917));
        assert!(fields.ambiguous_year);
    }

    #[test]
    fn four_digit_years_are_verbatim() {
        let (_, fields) = run("yyyy", "0064").unwrap();
        assert_eq!(fields.year, Some(64));
        assert!(!fields.ambiguous_year);
    }

    #[test]
    fn signed_year_fallback_ignores_the_cap() {
        let (consumed, fields) = run("y", "-43").unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(fields.year, Some(-43));
    }

    #[test]
    fn month_names_use_longest_match() {
        let (consumed, fields) = run("MMMM", "July").unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(fields.month, Some(6));

        // The short table also resolves, modulo table size.
        let (_, fields) = run("MMM", "Jul").unwrap();
        assert_eq!(fields.month, Some(6));
    }

    #[test]
    fn weekday_falls_back_to_short_names() {
        let (_, fields) = run("E", "Wednesday").unwrap();
        assert_eq!(fields.day_of_week, Some(3));

        let (_, fields) = run("E", "Wed").unwrap();
        assert_eq!(fields.day_of_week, Some(3));

        assert!(run("E", "Someday").is_none());
    }

    #[test]
    fn era_and_ampm_are_optional_matches() {
        let (consumed, fields) = run("G", "AD").unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(fields.era, Some(1));

        // No match: success, nothing consumed, field unset.
        let (consumed, fields) = run("G", "1996").unwrap();
        assert_eq!(consumed, 0);
        assert_eq!(fields.era, None);

        let (_, fields) = run("a", "pm").unwrap();
        assert_eq!(fields.ampm, Some(1));
    }

    #[test]
    fn quarter_sets_month_and_first_day() {
        let (_, fields) = run("QQQQ", "3rd quarter").unwrap();
        assert_eq!(fields.month, Some(6));
        assert_eq!(fields.day, Some(1));

        let (_, fields) = run("Q", "Q4").unwrap();
        assert_eq!(fields.month, Some(9));
        assert_eq!(fields.day, Some(1));

        assert!(run("Q", "fifth quarter").is_none());
    }

    #[test]
    fn twelve_hour_clock_folds_noon_at_capture() {
        let (_, fields) = run("h", "12").unwrap();
        assert_eq!(fields.hours, Some(0));

        let (_, fields) = run("h", "7").unwrap();
        assert_eq!(fields.hours, Some(7));

        let (_, fields) = run("H", "12").unwrap();
        assert_eq!(fields.hours, Some(12));
    }

    #[test]
    fn fractional_seconds_left_justify() {
        let (_, fields) = run("S", "4").unwrap();
        assert_eq!(fields.millis, Some(400));

        let (_, fields) = run("S", "123").unwrap();
        assert_eq!(fields.millis, Some(123));

        let (_, fields) = run("S", "123456").unwrap();
        assert_eq!(fields.millis, Some(123));

        let (_, fields) = run("S", "9996").unwrap();
        assert_eq!(fields.millis, Some(1000));
    }

    #[test]
    fn timezone_forms() {
        // Packed form; captured with the sign flipped (minutes west).
        let (_, fields) = run("Z", "-0800").unwrap();
        assert_eq!(fields.tz_offset, Some(480));

        let (_, fields) = run("Z", "+0530").unwrap();
        assert_eq!(fields.tz_offset, Some(-330));

        // Colon form.
        let (_, fields) = run("Z", "-08:00").unwrap();
        assert_eq!(fields.tz_offset, Some(480));

        // Bare hours.
        let (_, fields) = run("Z", "+8").unwrap();
        assert_eq!(fields.tz_offset, Some(-480));

        // GMT prefix, with and without an offset.
        let (_, fields) = run("Z", "GMT+8").unwrap();
        assert_eq!(fields.tz_offset, Some(-480));

        let (consumed, fields) = run("Z", "GMT").unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(fields.tz_offset, Some(0));

        assert!(run("Z", "PST").is_none());
    }

    #[test]
    fn whitespace_elements_require_whitespace() {
        assert!(run("d d", "1 2").is_some());
        assert!(run("d d", "12").is_none());

        // Extra whitespace collapses into the single element.
        let (consumed, _) = run("d d", "1    2").unwrap();
        assert_eq!(consumed, 6);
    }

    #[test]
    fn literals_are_byte_exact() {
        assert!(run("d'x'd", "1x2").is_some());
        assert!(run("d'x'd", "1X2").is_none());
    }

    #[test]
    fn day_of_year_has_no_sub_parser() {
        assert!(run("DDD", "123").is_none());
    }

    #[test]
    fn native_digits_map_before_matching() {
        let mut symbols = EN;
        symbols.zero_digit = Some('\u{0660}');
        let input = "\u{0661}\u{0662}:\u{0663}\u{0664}";
        let (consumed, fields) = run_with_symbols("HH:mm", input, &symbols).unwrap();
        assert_eq!(consumed, input.len());
        assert_eq!(fields.hours, Some(12));
        assert_eq!(fields.minutes, Some(34));
    }
}
