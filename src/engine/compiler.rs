//! Pattern compilation.
//!
//! This module holds the static side of the engine: a pattern string is
//! scanned once, at construction time, into the element list the matcher
//! walks on every parse. Compilation never fails; anything that is not a
//! pattern letter, a space, or quote syntax becomes literal text.
//!
//! ```text
//! "yyyy.MM.dd 'at' HH:mm"
//!     │
//!     ▼ compile
//! [Field(y,4)] [Lit "."] [Field(M,2)] [Lit "."] [Field(d,2)] [Ws]
//! [Lit "at"] [Ws] [Field(H,2)*] [Lit ":"] [Field(m,2)]
//! ```
//!
//! A second pass marks abut heads (`*` above would apply to `H` only if the
//! `:` separators were absent): a numeric field directly followed by another
//! numeric field, where the preceding element is not itself a numeric field.

use crate::symbols::DateTimeSymbols;
use crate::{FieldSpec, PatternItem};

/// The reserved pattern letters.
const PATTERN_LETTERS: &str = "GyMdkHmsSEDahKzZvQL";

/// Letters that parse as digit runs. `M` and `L` are handled separately
/// since their presentation depends on the repeat count.
const NUMERIC_LETTERS: &str = "ydhHmsSDkK";

fn is_numeric_field(letter: char, count: usize) -> bool {
    if letter == 'M' || letter == 'L' {
        // Three or more repetitions render month names, not digits.
        return count < 3;
    }
    NUMERIC_LETTERS.contains(letter)
}

fn is_numeric_item(item: &PatternItem) -> bool {
    matches!(item, PatternItem::Field(f) if f.numeric)
}

/// Compile a pattern string into its element list.
pub(crate) fn compile(pattern: &str) -> Vec<PatternItem> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut items = Vec::new();
    let mut buf = String::new();
    let mut in_quote = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if in_quote {
            if ch == '\'' {
                if chars.get(i + 1) == Some(&'\'') {
                    buf.push('\'');
                    i += 2;
                } else {
                    in_quote = false;
                    i += 1;
                }
            } else {
                buf.push(ch);
                i += 1;
            }
        } else if ch == ' ' {
            flush_literal(&mut items, &mut buf);
            items.push(PatternItem::Whitespace);
            while chars.get(i) == Some(&' ') {
                i += 1;
            }
        } else if PATTERN_LETTERS.contains(ch) {
            flush_literal(&mut items, &mut buf);
            let mut count = 1;
            while chars.get(i + count) == Some(&ch) {
                count += 1;
            }
            items.push(PatternItem::Field(FieldSpec {
                letter: ch,
                count,
                numeric: is_numeric_field(ch, count),
                abut_start: false,
            }));
            i += count;
        } else if ch == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                buf.push('\'');
                i += 2;
            } else {
                in_quote = true;
                i += 1;
            }
        } else {
            buf.push(ch);
            i += 1;
        }
    }
    flush_literal(&mut items, &mut buf);

    mark_abut_heads(&mut items);
    items
}

fn flush_literal(items: &mut Vec<PatternItem>, buf: &mut String) {
    if !buf.is_empty() {
        items.push(PatternItem::Literal(std::mem::take(buf)));
    }
}

/// Mark the head of every abutting numeric run. Only the head's width is
/// allowed to shrink during the retry loop, so the matcher needs to know
/// where each run begins.
fn mark_abut_heads(items: &mut [PatternItem]) {
    for i in 0..items.len() {
        if !is_numeric_item(&items[i]) {
            continue;
        }
        let prev_numeric = i > 0 && is_numeric_item(&items[i - 1]);
        let next_numeric = items.get(i + 1).is_some_and(is_numeric_item);
        if !prev_numeric && next_numeric {
            if let PatternItem::Field(f) = &mut items[i] {
                f.abut_start = true;
            }
        }
    }
}

/// Resolve a standard-format selector to a pattern string.
///
/// 0..=3 are the date formats (full, long, medium, short), 4..=7 the time
/// formats, 8..=11 the combined formats where `{1}` takes the date pattern
/// and `{0}` the time pattern of the same width. Anything out of range
/// falls back to the combined medium format.
pub(crate) fn standard_pattern(style: usize, symbols: &DateTimeSymbols) -> String {
    let style = if style > 11 { 10 } else { style };
    match style {
        0..=3 => symbols.date_formats[style].to_string(),
        4..=7 => symbols.time_formats[style - 4].to_string(),
        _ => symbols.date_time_formats[style - 8]
            .replace("{1}", symbols.date_formats[style - 8])
            .replace("{0}", symbols.time_formats[style - 8]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(letter: char, count: usize) -> PatternItem {
        PatternItem::Field(FieldSpec { letter, count, numeric: is_numeric_field(letter, count), abut_start: false })
    }

    fn abut_head(letter: char, count: usize) -> PatternItem {
        PatternItem::Field(FieldSpec { letter, count, numeric: true, abut_start: true })
    }

    fn literal(text: &str) -> PatternItem {
        PatternItem::Literal(text.to_string())
    }

    #[test]
    fn compiles_fields_literals_and_whitespace() {
        let items = compile("yyyy.MM.dd G 'at' HH:mm:ss");
        assert_eq!(
            items,
            vec![
                field('y', 4),
                literal("."),
                field('M', 2),
                literal("."),
                field('d', 2),
                PatternItem::Whitespace,
                field('G', 1),
                PatternItem::Whitespace,
                literal("at"),
                PatternItem::Whitespace,
                field('H', 2),
                literal(":"),
                field('m', 2),
                literal(":"),
                field('s', 2),
            ]
        );
    }

    #[test]
    fn collapses_pattern_whitespace_runs() {
        let items = compile("d   d");
        assert_eq!(items, vec![field('d', 1), PatternItem::Whitespace, field('d', 1)]);
    }

    #[test]
    fn doubled_apostrophe_is_a_literal_quote() {
        assert_eq!(compile("h 'o''clock'"), vec![field('h', 1), PatternItem::Whitespace, literal("o'clock")]);
        assert_eq!(compile("''"), vec![literal("'")]);
    }

    #[test]
    fn quoting_protects_pattern_letters() {
        let items = compile("'year' y");
        assert_eq!(items, vec![literal("year"), PatternItem::Whitespace, field('y', 1)]);
    }

    #[test]
    fn unterminated_quote_flushes_as_literal() {
        assert_eq!(compile("'half"), vec![literal("half")]);
    }

    #[test]
    fn non_reserved_letters_are_literals() {
        // ISO timestamps can spell the T unquoted since it is not reserved.
        // The T folds into the surrounding literal, which leaves dd and HH
        // abutting.
        let items = compile("yyyy-MM-ddTHH");
        assert_eq!(
            items,
            vec![field('y', 4), literal("-"), field('M', 2), literal("-T"), abut_head('d', 2), field('H', 2)]
        );
    }

    #[test]
    fn marks_abut_heads() {
        let items = compile("HHmmss");
        assert_eq!(items, vec![abut_head('H', 2), field('m', 2), field('s', 2)]);

        let items = compile("yyyyMMdd");
        assert_eq!(items, vec![abut_head('y', 4), field('M', 2), field('d', 2)]);
    }

    #[test]
    fn separated_numeric_fields_are_not_abutting() {
        let items = compile("HH:mm");
        assert_eq!(items, vec![field('H', 2), literal(":"), field('m', 2)]);
    }

    #[test]
    fn textual_month_does_not_join_a_run() {
        // MMM renders text, so dd has no numeric neighbor on either side.
        let items = compile("MMMdd");
        assert_eq!(items, vec![field('M', 3), field('d', 2)]);
    }

    #[test]
    fn month_is_numeric_only_below_three_repeats() {
        assert!(is_numeric_field('M', 1));
        assert!(is_numeric_field('M', 2));
        assert!(!is_numeric_field('M', 3));
        assert!(!is_numeric_field('M', 4));
        assert!(is_numeric_field('L', 2));
        assert!(!is_numeric_field('L', 4));
    }

    #[test]
    fn standard_patterns_select_by_group() {
        let symbols = DateTimeSymbols::default();
        assert_eq!(standard_pattern(3, &symbols), "M/d/yy");
        assert_eq!(standard_pattern(7, &symbols), "h:mm a");
        assert_eq!(standard_pattern(11, &symbols), "M/d/yy, h:mm a");
    }

    #[test]
    fn out_of_range_style_falls_back_to_combined_medium() {
        let symbols = DateTimeSymbols::default();
        assert_eq!(standard_pattern(99, &symbols), standard_pattern(10, &symbols));
        assert_eq!(standard_pattern(10, &symbols), "MMM d, y, h:mm:ss a");
    }
}
