use crate::engine::{self, compiler};
use crate::moment::DateLike;
use crate::symbols::DateTimeSymbols;
use crate::PatternItem;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Parsing context.
///
/// This holds the environment needed to resolve two-digit years: the wall
/// clock and the width of the trailing window. Injecting `now` keeps parses
/// deterministic in tests.
#[derive(Debug, Clone)]
pub struct Context {
    /// Reference instant treated as "now".
    pub now: NaiveDateTime,
    /// Years before `now` at which the two-digit-year window opens. The
    /// window spans one century, so the default of 80 resolves `yy` into
    /// `[now - 80, now + 19]`.
    pub century_window: i32,
}

impl Default for Context {
    fn default() -> Self {
        if cfg!(test) {
            let date = NaiveDate::from_ymd_opt(1997, 7, 10).unwrap();
            let time = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
            Self { now: NaiveDateTime::new(date, time), century_window: 80 }
        } else {
            Self { now: Local::now().naive_local(), century_window: 80 }
        }
    }
}

/// Options that affect parsing/resolution behavior.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Reject parses whose explicit date fields do not round-trip through
    /// the calendar (February 30 resolves to March 1 and is refused) or
    /// whose time fields are out of range.
    pub validate: bool,
}

/// A compact per-element view of a compiled pattern, used by diagnostic
/// output (see the CLI's debug report).
#[derive(Debug, Clone)]
pub struct ElementSummary {
    /// `"literal"`, `"whitespace"` or `"field"`.
    pub kind: &'static str,
    /// The literal text, or the pattern letter and repeat count.
    pub detail: String,
    pub numeric: bool,
    pub abut_start: bool,
}

/// A compiled date/time pattern.
///
/// Construction compiles the pattern once; the parser itself is immutable
/// afterwards and can be reused (and shared) across any number of calls.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use datepattern::{DateTimeParser, Moment, Options};
///
/// let parser = DateTimeParser::new("MMMM d, yyyy");
/// let start = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let mut date = Moment::new(start);
/// let consumed = parser.parse("July 10, 1996", &mut date, &Options::default());
/// assert_eq!(consumed, 13);
/// assert_eq!(date.naive().date(), NaiveDate::from_ymd_opt(1996, 7, 10).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct DateTimeParser {
    items: Vec<PatternItem>,
    symbols: DateTimeSymbols,
    context: Context,
}

impl DateTimeParser {
    /// Compile `pattern` against the default (English) symbols.
    pub fn new(pattern: &str) -> Self {
        Self::with_symbols(pattern, DateTimeSymbols::default())
    }

    /// Compile `pattern` against a specific locale's symbols.
    pub fn with_symbols(pattern: &str, symbols: DateTimeSymbols) -> Self {
        DateTimeParser { items: compiler::compile(pattern), symbols, context: Context::default() }
    }

    /// Use one of the twelve standard formats: 0..=3 date (full, long,
    /// medium, short), 4..=7 time, 8..=11 combined date and time. Anything
    /// out of range falls back to the combined medium format.
    pub fn standard(style: usize) -> Self {
        Self::standard_with_symbols(style, DateTimeSymbols::default())
    }

    /// Standard format from a specific locale's symbols.
    pub fn standard_with_symbols(style: usize, symbols: DateTimeSymbols) -> Self {
        let pattern = compiler::standard_pattern(style, &symbols);
        Self::with_symbols(&pattern, symbols)
    }

    /// Replace the clock used for two-digit-year resolution.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Describe the compiled element list, one summary per element.
    pub fn describe(&self) -> Vec<ElementSummary> {
        self.items
            .iter()
            .map(|item| match item {
                PatternItem::Literal(text) => ElementSummary {
                    kind: "literal",
                    detail: format!("{:?}", text),
                    numeric: false,
                    abut_start: false,
                },
                PatternItem::Whitespace => ElementSummary {
                    kind: "whitespace",
                    detail: "\\s+".to_string(),
                    numeric: false,
                    abut_start: false,
                },
                PatternItem::Field(f) => ElementSummary {
                    kind: "field",
                    detail: format!("{} x{}", f.letter, f.count),
                    numeric: f.numeric,
                    abut_start: f.abut_start,
                },
            })
            .collect()
    }

    /// Parse `text` into `date`, returning how many bytes of `text` were
    /// consumed. Zero means the parse failed and `date` was left untouched;
    /// fields the pattern does not mention keep their prior values.
    pub fn parse<D: DateLike + Clone>(&self, text: &str, date: &mut D, options: &Options) -> usize {
        // Work on a scratch copy so a failure, even one detected late in
        // resolution, never leaks partial state to the caller.
        let mut scratch = date.clone();
        let mut parser = engine::Parser::new(text, &self.items, &self.symbols, &self.context);
        let Some(consumed) = parser.run() else { return 0 };
        if !engine::resolve(&parser.fields, &mut scratch, options.validate, &self.context) {
            return 0;
        }
        *date = scratch;
        consumed
    }

    /// Parse with round-trip validation.
    #[deprecated(note = "use `parse` with `Options { validate: true }`")]
    pub fn strict_parse<D: DateLike + Clone>(&self, text: &str, date: &mut D) -> usize {
        self.parse(text, date, &Options { validate: true })
    }
}

/// Compile `pattern` and parse `text` into `date` in one call.
///
/// Convenience for one-shot use; construct a [`DateTimeParser`] when the
/// same pattern is applied repeatedly.
pub fn parse_into<D: DateLike + Clone>(pattern: &str, text: &str, date: &mut D) -> usize {
    DateTimeParser::new(pattern).parse(text, date, &Options::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moment::Moment;
    use chrono::{NaiveDate, NaiveDateTime};

    fn start() -> Moment {
        moment(1970, 1, 1, 0, 0, 0)
    }

    fn moment(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> Moment {
        Moment::new(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(hh, mm, ss).unwrap())
    }

    fn naive(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(hh, mm, ss).unwrap()
    }

    #[test]
    fn date_scenarios() {
        // (pattern, input, expected local datetime)
        let cases: Vec<(&str, &str, NaiveDateTime)> = vec![
            ("yyyy.MM.dd G 'at' HH:mm:ss", "1996.07.10 AD at 15:08:56", naive(1996, 7, 10, 15, 8, 56)),
            ("yyyyMMdd", "19960710", naive(1996, 7, 10, 0, 0, 0)),
            ("MMMM d, yyyy", "July 10, 1996", naive(1996, 7, 10, 0, 0, 0)),
            ("MM/dd/yy", "01/11/12", naive(2012, 1, 11, 0, 0, 0)),
            ("MM/dd/yy", "05/04/64", naive(1964, 5, 4, 0, 0, 0)),
            ("h:mm a", "12:08 PM", naive(1970, 1, 1, 12, 8, 0)),
            ("HHmmss", "123456", naive(1970, 1, 1, 12, 34, 56)),
            ("HHmmss", "12345", naive(1970, 1, 1, 1, 23, 45)),
            ("EEEE, MMMM d, yyyy", "Wednesday, July 10, 1996", naive(1996, 7, 10, 0, 0, 0)),
        ];

        for (pattern, input, expected) in cases {
            let mut date = start();
            let consumed = parse_into(pattern, input, &mut date);
            assert_eq!(consumed, input.len(), "pattern {:?} input {:?}", pattern, input);
            assert_eq!(date.naive(), expected, "pattern {:?} input {:?}", pattern, input);
        }
    }

    #[test]
    fn failures_return_zero_and_leave_the_date_alone() {
        let cases: Vec<(&str, &str)> = vec![
            ("HHmmss", "1234"),
            ("MMMM d, yyyy", "Smarch 10, 1996"),
            ("MM/dd/yy", "01-11-12"),
            ("d d", "12"),
            ("E", "noday"),
        ];

        for (pattern, input) in cases {
            let mut date = moment(1996, 7, 10, 9, 30, 0);
            let before = date;
            assert_eq!(parse_into(pattern, input, &mut date), 0, "pattern {:?} input {:?}", pattern, input);
            assert_eq!(date, before, "pattern {:?} input {:?}", pattern, input);
        }
    }

    #[test]
    fn validation_failure_keeps_the_date_pristine() {
        let parser = DateTimeParser::new("MM/dd/yyyy");
        let mut date = moment(1996, 7, 10, 9, 30, 0);
        let before = date;

        assert_eq!(parser.parse("02/30/1996", &mut date, &Options { validate: true }), 0);
        assert_eq!(date, before);

        // Without validation the same input resolves by rolling over.
        let consumed = parser.parse("02/30/1996", &mut date, &Options::default());
        assert_eq!(consumed, 10);
        assert_eq!(date.naive().date(), NaiveDate::from_ymd_opt(1996, 3, 1).unwrap());
    }

    #[test]
    fn strict_parse_is_parse_with_validation() {
        let parser = DateTimeParser::new("MM/dd/yyyy");
        let mut date = start();
        #[allow(deprecated)]
        let consumed = parser.strict_parse("02/30/1996", &mut date);
        assert_eq!(consumed, 0);

        #[allow(deprecated)]
        let consumed = parser.strict_parse("07/10/1996", &mut date);
        assert_eq!(consumed, 10);
        assert_eq!(date.naive().date(), NaiveDate::from_ymd_opt(1996, 7, 10).unwrap());
    }

    #[test]
    fn timezone_shift_moves_the_instant() {
        let parser = DateTimeParser::new("Z");
        let mut date = moment(1996, 7, 10, 0, 0, 0);
        let before = date.timestamp_millis();
        let consumed = parser.parse("-0800", &mut date, &Options::default());
        assert_eq!(consumed, 5);
        assert_eq!(date.timestamp_millis() - before, 480 * 60_000);
    }

    #[test]
    fn extra_whitespace_is_tolerated_where_the_pattern_has_some() {
        let mut date = start();
        let input = "July     10,     1996";
        let consumed = parse_into("MMMM d, yyyy", input, &mut date);
        assert_eq!(consumed, input.len());
        assert_eq!(date.naive().date(), NaiveDate::from_ymd_opt(1996, 7, 10).unwrap());
    }

    #[test]
    fn trailing_input_is_not_consumed() {
        let mut date = start();
        let consumed = parse_into("yyyy", "1996 and later", &mut date);
        assert_eq!(consumed, 4);
        assert_eq!(date.year(), 1996);
    }

    #[test]
    fn standard_styles_parse_their_own_shapes() {
        let mut date = start();
        let consumed = DateTimeParser::standard(3).parse("7/10/96", &mut date, &Options::default());
        assert_eq!(consumed, 7);
        assert_eq!(date.naive().date(), NaiveDate::from_ymd_opt(1996, 7, 10).unwrap());

        let mut date = start();
        let consumed = DateTimeParser::standard(7).parse("3:30 PM", &mut date, &Options::default());
        assert_eq!(consumed, 7);
        assert_eq!(date.naive().time(), NaiveTime::from_hms_opt(15, 30, 0).unwrap());

        // Combined medium, also the out-of-range fallback.
        let mut date = start();
        let input = "Jul 10, 1996, 3:30:00 PM";
        let consumed = DateTimeParser::standard(99).parse(input, &mut date, &Options::default());
        assert_eq!(consumed, input.len());
        assert_eq!(date.naive(), naive(1996, 7, 10, 15, 30, 0));
    }

    #[test]
    fn context_controls_the_century_window() {
        let context = Context { now: naive(1997, 7, 10, 12, 0, 0), century_window: 20 };
        let parser = DateTimeParser::new("MM/dd/yy").with_context(context);
        let mut date = start();

        // Window is [1977, 2076]: 50 reads as 2050.
        assert!(parser.parse("01/01/50", &mut date, &Options::default()) > 0);
        assert_eq!(date.year(), 2050);
    }

    #[test]
    fn date_only_values_ignore_time_fields() {
        let parser = DateTimeParser::new("MM/dd/yyyy HH:mm");
        let mut date = Moment::date_only(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        let consumed = parser.parse("07/10/1996 15:08", &mut date, &Options::default());
        assert_eq!(consumed, 16);
        assert_eq!(date.naive().date(), NaiveDate::from_ymd_opt(1996, 7, 10).unwrap());
        assert_eq!(date.naive().time(), NaiveTime::MIN);
    }
}
