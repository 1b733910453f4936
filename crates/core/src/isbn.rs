//! ISBN normalization and format checks.
//!
//! The same normalized form is used for validation, storage, and duplicate
//! lookups, so `978-0-306-40615-7` and `9780306406157` are the same ISBN.

use std::sync::LazyLock;

use regex::Regex;

/// Exactly 10 digits, or exactly 13 digits.
const ISBN_PATTERN: &str = r"^[0-9]{10}([0-9]{3})?$";

static ISBN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ISBN_PATTERN).expect("valid regex"));

/// Remove the separators people commonly type inside an ISBN (hyphens and
/// whitespace). Any other character is kept, so it fails [`is_valid_isbn`].
///
/// ```
/// use bookbase_core::isbn::normalize_isbn;
/// assert_eq!(normalize_isbn("978-0-306-40615-7"), "9780306406157");
/// assert_eq!(normalize_isbn(" 0 12 345678 9 "), "0123456789");
/// ```
pub fn normalize_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Whether `raw` is a 10- or 13-digit ISBN once normalized.
pub fn is_valid_isbn(raw: &str) -> bool {
    ISBN_RE.is_match(&normalize_isbn(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_hyphens_and_spaces() {
        assert_eq!(normalize_isbn("0-12-345678-9"), "0123456789");
        assert_eq!(normalize_isbn("978 0306 406157"), "9780306406157");
    }

    #[test]
    fn normalize_keeps_other_characters() {
        assert_eq!(normalize_isbn("12a-34"), "12a34");
    }

    #[test]
    fn ten_digit_isbn_is_valid() {
        assert!(is_valid_isbn("0123456789"));
    }

    #[test]
    fn thirteen_digit_isbn_is_valid() {
        assert!(is_valid_isbn("9780306406157"));
        assert!(is_valid_isbn("978-0-306-40615-7"));
    }

    #[test]
    fn wrong_lengths_are_invalid() {
        assert!(!is_valid_isbn("12345"));
        assert!(!is_valid_isbn("12345678901"));
        assert!(!is_valid_isbn("12345678901234"));
    }

    #[test]
    fn letters_are_invalid() {
        assert!(!is_valid_isbn("abcdefghij"));
        assert!(!is_valid_isbn("012345678X"));
    }

    #[test]
    fn empty_is_invalid() {
        assert!(!is_valid_isbn(""));
        assert!(!is_valid_isbn("---"));
    }
}
