//! Locale symbol tables.
//!
//! [`DateTimeSymbols`] is the read-only record the parser consults for
//! textual fields (era strings, month and weekday names, AM/PM markers,
//! quarter names) and for the standard date/time format strings. Tables are
//! `&'static` string slices; the `Default` impl is the English (US) data and
//! custom locales are expected to be `static` tables of the same shape.
//!
//! The longest-prefix matcher used by every textual field also lives here.

/// Locale data consumed by the parser.
///
/// Month and weekday arrays are indexed from zero (January, Sunday). The
/// four-entry format arrays are ordered full, long, medium, short. In the
/// `date_time_formats` strings, `{1}` stands for the date pattern and `{0}`
/// for the time pattern of the same width.
#[derive(Debug, Clone, Copy)]
pub struct DateTimeSymbols {
    pub eras: &'static [&'static str],
    pub ampms: &'static [&'static str],
    pub months: &'static [&'static str],
    pub standalone_months: &'static [&'static str],
    pub short_months: &'static [&'static str],
    pub standalone_short_months: &'static [&'static str],
    pub weekdays: &'static [&'static str],
    pub short_weekdays: &'static [&'static str],
    pub quarters: &'static [&'static str],
    pub short_quarters: &'static [&'static str],
    pub date_formats: [&'static str; 4],
    pub time_formats: [&'static str; 4],
    pub date_time_formats: [&'static str; 4],
    /// Codepoint of the locale's digit zero, when the locale does not write
    /// ASCII digits. `None` means ASCII.
    pub zero_digit: Option<char>,
}

/// English (US) symbols.
pub(crate) const EN: DateTimeSymbols = DateTimeSymbols {
    eras: &["BC", "AD"],
    ampms: &["AM", "PM"],
    months: &[
        "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
        "November", "December",
    ],
    standalone_months: &[
        "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
        "November", "December",
    ],
    short_months: &["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
    standalone_short_months: &["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
    weekdays: &["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"],
    short_weekdays: &["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
    quarters: &["1st quarter", "2nd quarter", "3rd quarter", "4th quarter"],
    short_quarters: &["Q1", "Q2", "Q3", "Q4"],
    date_formats: ["EEEE, MMMM d, y", "MMMM d, y", "MMM d, y", "M/d/yy"],
    time_formats: ["h:mm:ss a zzzz", "h:mm:ss a z", "h:mm:ss a", "h:mm a"],
    date_time_formats: ["{1} 'at' {0}", "{1} 'at' {0}", "{1}, {0}", "{1}, {0}"],
    zero_digit: None,
};

impl Default for DateTimeSymbols {
    fn default() -> Self {
        EN
    }
}

/// Find the candidate whose lowercased form is a prefix of the lowercased
/// input remainder and is strictly longer (in characters) than every other
/// matching candidate. Equal lengths keep the earliest candidate.
///
/// Returns `(candidate index, matched input bytes)`.
pub(crate) fn longest_match<'a, I>(candidates: I, rest: &str) -> Option<(usize, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, usize)> = None;
    let mut best_chars = 0;
    for (i, candidate) in candidates.into_iter().enumerate() {
        let chars = candidate.chars().count();
        if chars <= best_chars {
            continue;
        }
        if let Some(bytes) = match_prefix_ci(candidate, rest) {
            best = Some((i, bytes));
            best_chars = chars;
        }
    }
    best
}

/// Case-insensitive prefix test; returns how many bytes of `rest` the
/// candidate covers.
fn match_prefix_ci(candidate: &str, rest: &str) -> Option<usize> {
    let len = candidate.chars().count();
    let end = match rest.char_indices().nth(len) {
        Some((i, _)) => i,
        None if rest.chars().count() == len => rest.len(),
        None => return None,
    };
    let prefix = &rest[..end];
    if prefix.to_lowercase() == candidate.to_lowercase() {
        Some(end)
    } else {
        None
    }
}
