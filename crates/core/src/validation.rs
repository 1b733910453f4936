//! Field-level validation for book submissions.
//!
//! Pure logic shared by the single-record API and the CSV importer. Every
//! rule is evaluated; the result lists all violations in rule order.

use crate::book::{BookFields, FIELD_AUTHOR, FIELD_ISBN, FIELD_RATING, FIELD_TITLE, FIELD_YEAR};
use crate::isbn::is_valid_isbn;

pub const YEAR_MIN: i32 = 1000;
pub const YEAR_MAX: i32 = 2030;

pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;

pub const MSG_TITLE_REQUIRED: &str = "Title is required";
pub const MSG_AUTHOR_REQUIRED: &str = "Author is required";
pub const MSG_INVALID_ISBN: &str = "Invalid ISBN format. Must be 10 or 13 digits";
pub const MSG_INVALID_YEAR: &str = "Invalid publication year";
pub const MSG_INVALID_RATING: &str = "Rating must be between 1 and 5 stars";

/// Check a candidate record and return human-readable error messages.
///
/// An empty result means the record is valid. Blank optional fields are
/// treated as absent.
pub fn validate_book_fields(fields: &BookFields) -> Vec<String> {
    let mut errors = Vec::new();

    if fields.value(FIELD_TITLE).is_none() {
        errors.push(MSG_TITLE_REQUIRED.to_string());
    }

    if fields.value(FIELD_AUTHOR).is_none() {
        errors.push(MSG_AUTHOR_REQUIRED.to_string());
    }

    if let Some(isbn) = fields.value(FIELD_ISBN) {
        if !is_valid_isbn(isbn) {
            errors.push(MSG_INVALID_ISBN.to_string());
        }
    }

    if let Some(year) = fields.value(FIELD_YEAR) {
        if parse_bounded(year, YEAR_MIN, YEAR_MAX).is_none() {
            errors.push(MSG_INVALID_YEAR.to_string());
        }
    }

    if let Some(rating) = fields.value(FIELD_RATING) {
        if parse_bounded(rating, RATING_MIN, RATING_MAX).is_none() {
            errors.push(MSG_INVALID_RATING.to_string());
        }
    }

    errors
}

/// Parse a purely-digit string and accept it only within `[min, max]`.
///
/// Signs, decimal points, and non-ASCII digits are rejected, as is any value
/// too large to fit an `i32`.
pub(crate) fn parse_bounded(value: &str, min: i32, max: i32) -> Option<i32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value
        .parse::<i32>()
        .ok()
        .filter(|n| (min..=max).contains(n))
}
