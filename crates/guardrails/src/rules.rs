//! Individual rule checks.
//!
//! Digits and word boundaries are Unicode-aware: a card number typed in
//! full-width or Arabic-Indic digits is still a card number.

use regex::Regex;
use std::sync::LazyLock;
use unicode_categories::UnicodeCategories;

/// A standalone run of 12–16 decimal digits, e.g. a payment card number.
static CARD_LIKE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{12,16}\b").expect("card number pattern is a valid regex")
});

/// Length above which the quoted prompt is treated as a bulk paste.
const TRANSPORT_QUOTED_LIMIT: usize = 1000;

/// Non-decimal characters that still count as digits: superscripts,
/// subscripts, circled and dingbat digits, Ethiopic digits.
const DIGIT_RANGES: &[(char, char)] = &[
    ('\u{00B2}', '\u{00B3}'),
    ('\u{00B9}', '\u{00B9}'),
    ('\u{1369}', '\u{1371}'),
    ('\u{19DA}', '\u{19DA}'),
    ('\u{2070}', '\u{2070}'),
    ('\u{2074}', '\u{2079}'),
    ('\u{2080}', '\u{2089}'),
    ('\u{2460}', '\u{2468}'),
    ('\u{2474}', '\u{247C}'),
    ('\u{2488}', '\u{2490}'),
    ('\u{24EA}', '\u{24EA}'),
    ('\u{24F5}', '\u{24FD}'),
    ('\u{24FF}', '\u{24FF}'),
    ('\u{2776}', '\u{277E}'),
    ('\u{2780}', '\u{2788}'),
    ('\u{278A}', '\u{2792}'),
];

/// Whether `text` contains a standalone 12–16 digit run.
///
/// Runs of 17 or more digits do not match: there is no word boundary inside
/// them.
pub fn contains_card_like_number(text: &str) -> bool {
    CARD_LIKE_NUMBER.is_match(text)
}

/// Coarse transport-level check applied before an agent runs.
///
/// Flags prompts that contain a space and a digit and whose quoted
/// representation exceeds 1000 characters. This is independent of the
/// digit-run rule: short prompts with card numbers pass here and are caught
/// by the policy instead.
pub fn transport_pii_suspected(prompt: &str) -> bool {
    prompt.contains(' ')
        && prompt.chars().any(is_digit)
        && quoted_len(prompt) > TRANSPORT_QUOTED_LIMIT
}

/// Decimal digits plus the other characters with a digit value.
fn is_digit(c: char) -> bool {
    c.is_number_decimal_digit() || DIGIT_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
}

/// Length of `text` as a quoted, escaped literal.
///
/// Single quotes are used unless the text contains `'` and no `"`; only the
/// chosen quote is escaped. Backslash, tab, newline and carriage return take
/// two characters; other non-printable characters take a `\x`, `\u` or `\U`
/// escape sized by code point.
pub fn quoted_len(text: &str) -> usize {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let body: usize = text
        .chars()
        .map(|c| match c {
            '\\' | '\t' | '\n' | '\r' => 2,
            c if c == quote => 2,
            c if is_printable(c) => 1,
            c => match u32::from(c) {
                0..=0xFF => 4,
                0x100..=0xFFFF => 6,
                _ => 10,
            },
        })
        .sum();
    body + 2
}

/// Space and every character outside the control, format, private-use and
/// separator categories.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !(c.is_other_control()
        || c.is_other_format()
        || c.is_other_private_use()
        || c.is_separator_space()
        || c.is_separator_line()
        || c.is_separator_paragraph())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_numbers_match() {
        assert!(contains_card_like_number("My card number is 4111111111111111, please refund me"));
        assert!(contains_card_like_number("acct 123456789012"));
    }

    #[test]
    fn non_ascii_digit_runs_match() {
        assert!(contains_card_like_number("card ４１１１１１１１１１１１１１１１ refund"));
        assert!(contains_card_like_number("card ٤١١١١١١١١١١١١١١١ refund"));
        assert!(contains_card_like_number("card ४१११११११११११११११ refund"));
        assert!(!contains_card_like_number("order ４１１１１"));
    }

    #[test]
    fn short_and_overlong_runs_do_not_match() {
        assert!(!contains_card_like_number("order 123456789"));
        assert!(!contains_card_like_number("id 12345678901234567"));
        assert!(!contains_card_like_number("ref A4111111111111111"));
    }

    #[test]
    fn transport_rule_needs_all_three_conditions() {
        let long_with_digit = format!("{} 7", "x".repeat(1000));
        assert!(transport_pii_suspected(&long_with_digit));

        assert!(!transport_pii_suspected(&"x ".repeat(600)));
        assert!(!transport_pii_suspected(&format!("7{}", "x".repeat(1200))));
        assert!(!transport_pii_suspected("card 4111111111111111"));
    }

    #[test]
    fn transport_rule_accepts_any_digit_kind() {
        let padding = "x".repeat(1000);
        assert!(transport_pii_suspected(&format!("a ４ {padding}")));
        assert!(transport_pii_suspected(&format!("a ² {padding}")));
        assert!(!transport_pii_suspected(&format!("a ½ {padding}")));
    }

    #[test]
    fn transport_rule_counts_escapes() {
        // 400 newlines escape to 800 chars, plus the quotes and "a 1".
        let prompt = format!("a 1{}", "\n".repeat(400));
        assert!(!transport_pii_suspected(&prompt));
        let prompt = format!("a 1{}", "\n".repeat(499));
        assert!(transport_pii_suspected(&prompt));
    }

    #[test]
    fn apostrophes_alone_switch_quotes_instead_of_escaping() {
        let at_limit = format!("a 1{}", "'".repeat(995));
        assert_eq!(quoted_len(&at_limit), 1000);
        assert!(!transport_pii_suspected(&at_limit));

        let over = format!("a 1{}", "'".repeat(996));
        assert!(transport_pii_suspected(&over));
    }

    #[test]
    fn mixed_quotes_escape_single_quotes_only() {
        let prompt = format!("a 1\"{}", "'".repeat(497));
        assert_eq!(quoted_len(&prompt), 1000);
        assert!(!transport_pii_suspected(&prompt));
        assert_eq!(quoted_len("say \"hi\""), 10);
    }

    #[test]
    fn quoted_len_of_non_ascii() {
        assert_eq!(quoted_len("café"), 6);
        assert_eq!(quoted_len("\u{00A0}"), 6);
        assert_eq!(quoted_len("\u{2028}"), 8);
        assert_eq!(quoted_len("\u{7}"), 6);
        assert_eq!(quoted_len("a\\b"), 6);
    }
}
