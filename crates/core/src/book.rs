//! Book field maps and the normalized record built from them.
//!
//! Submissions arrive as loosely typed field maps (a JSON object from the
//! API, a CSV row from an upload). [`BookFields`] holds them as raw strings
//! so the same validation runs for both; [`NewBook`] is the typed form that
//! reaches the store.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::isbn::normalize_isbn;
use crate::types::DbId;
use crate::validation::{self, parse_bounded};

pub const FIELD_TITLE: &str = "title";
pub const FIELD_AUTHOR: &str = "author";
pub const FIELD_ISBN: &str = "isbn";
pub const FIELD_PUBLISHER: &str = "publisher";
pub const FIELD_YEAR: &str = "year";
pub const FIELD_GENRE: &str = "genre";
pub const FIELD_RATING: &str = "rating";

/// Every user-supplied book field, in canonical column order.
pub const BOOK_FIELDS: [&str; 7] = [
    FIELD_TITLE,
    FIELD_AUTHOR,
    FIELD_ISBN,
    FIELD_PUBLISHER,
    FIELD_YEAR,
    FIELD_GENRE,
    FIELD_RATING,
];

/// Fields that must be present and non-blank.
pub const REQUIRED_FIELDS: [&str; 2] = [FIELD_TITLE, FIELD_AUTHOR];

/// Raw field name -> string value mapping for one candidate record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFields(BTreeMap<String, String>);

impl BookFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// The raw value for `name`, exactly as supplied.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The trimmed value for `name`; `None` when absent or blank.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.raw(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Required fields that are missing or blank, in declaration order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|name| self.value(name).is_none())
            .collect()
    }

    /// Build a field map from a JSON request body.
    ///
    /// Strings are taken verbatim, numbers and booleans are rendered to text,
    /// and `null` means the field is absent. Arrays and objects are rejected.
    pub fn from_json(body: &Value) -> Result<Self, CoreError> {
        let Value::Object(map) = body else {
            return Err(CoreError::validation("Request body must be a JSON object"));
        };

        let mut fields = Self::new();
        let mut errors = Vec::new();
        for (name, value) in map {
            match value {
                Value::Null => {}
                Value::String(s) => fields.insert(name.as_str(), s.as_str()),
                Value::Number(n) => fields.insert(name.as_str(), n.to_string()),
                Value::Bool(b) => fields.insert(name.as_str(), b.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    errors.push(format!("Field '{name}' must be a string or number"));
                }
            }
        }

        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(CoreError::Validation(errors))
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BookFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A validated, normalized book ready to be inserted or written over an
/// existing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    /// Normalized (separators removed).
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub rating: Option<i32>,
}

impl NewBook {
    /// Validate `fields` and convert them into a typed record.
    ///
    /// Returns every validation message when the fields are not acceptable.
    pub fn from_fields(fields: &BookFields) -> Result<Self, Vec<String>> {
        let errors = validation::validate_book_fields(fields);
        if !errors.is_empty() {
            return Err(errors);
        }

        let required = |name: &str| fields.value(name).unwrap_or_default().to_string();
        let optional = |name: &str| fields.value(name).map(str::to_string);

        Ok(Self {
            title: required(FIELD_TITLE),
            author: required(FIELD_AUTHOR),
            isbn: fields.value(FIELD_ISBN).map(normalize_isbn),
            publisher: optional(FIELD_PUBLISHER),
            year: fields.value(FIELD_YEAR).and_then(|v| {
                parse_bounded(v, validation::YEAR_MIN, validation::YEAR_MAX)
            }),
            genre: optional(FIELD_GENRE),
            rating: fields.value(FIELD_RATING).and_then(|v| {
                parse_bounded(v, validation::RATING_MIN, validation::RATING_MAX)
            }),
        })
    }
}

/// The existing record that already owns an ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateBook {
    pub id: DbId,
    pub title: String,
    pub author: String,
}

impl DuplicateBook {
    /// Message returned to API callers trying to reuse this ISBN.
    pub fn conflict_message(&self) -> String {
        format!(
            "Duplicate ISBN: Book \"{}\" by {} already exists with this ISBN",
            self.title, self.author
        )
    }
}
