//! Filter/sort descriptors for listing and exporting books.
//!
//! [`BookFilter`] is the raw, user-facing parameter set. [`BookFilter::build`]
//! turns it into a [`BookQuery`]: a predicate tree over a closed set of
//! columns plus a validated sort. Column names only ever come from the enums
//! here, and values travel separately, so the repository layer can render
//! the tree with bound parameters only.

use serde::Deserialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Text columns that can appear in a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColumn {
    Title,
    Author,
    Genre,
}

impl TextColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextColumn::Title => "title",
            TextColumn::Author => "author",
            TextColumn::Genre => "genre",
        }
    }
}

/// Integer columns that can appear in a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntColumn {
    Year,
    Rating,
}

impl IntColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntColumn::Year => "year",
            IntColumn::Rating => "rating",
        }
    }
}

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    Title,
    Author,
    Year,
    Rating,
    Genre,
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Title => "title",
            SortColumn::Author => "author",
            SortColumn::Year => "year",
            SortColumn::Rating => "rating",
            SortColumn::Genre => "genre",
        }
    }

    /// Parse a user-supplied column name (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Some(SortColumn::Title),
            "author" => Some(SortColumn::Author),
            "year" => Some(SortColumn::Year),
            "rating" => Some(SortColumn::Rating),
            "genre" => Some(SortColumn::Genre),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }

    /// Parse `asc` / `desc` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Ascending),
            "desc" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Predicate tree
// ---------------------------------------------------------------------------

/// AND/OR-combined filter conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every record.
    All,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    /// Case-insensitive literal substring match.
    Contains { column: TextColumn, value: String },
    Equals { column: TextColumn, value: String },
    /// `column >= value` (inclusive).
    AtLeast { column: IntColumn, value: i32 },
    /// `column <= value` (inclusive).
    AtMost { column: IntColumn, value: i32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

/// An executable description of a book listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    pub predicate: Predicate,
    pub sort: SortSpec,
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            predicate: Predicate::All,
            sort: SortSpec::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Query parameters for listing and exporting books (`?search=&genre=...`).
///
/// Every field is optional; blank values are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookFilter {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub author: Option<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    pub rating_min: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_int_param(name: &str, value: &Option<String>) -> Result<Option<i32>, String> {
    match non_blank(value) {
        None => Ok(None),
        Some(v) => v
            .parse::<i32>()
            .map(Some)
            .map_err(|_| format!("{name} must be an integer")),
    }
}

impl BookFilter {
    /// Build the query descriptor for these parameters.
    ///
    /// Blank filters are omitted; with no filters the predicate is
    /// [`Predicate::All`]. Unknown `sort_by` / `sort_order` values fall back
    /// to title ascending. Non-integer numeric bounds are rejected.
    pub fn build(&self) -> Result<BookQuery, CoreError> {
        let mut conditions = Vec::new();
        let mut errors = Vec::new();

        if let Some(term) = non_blank(&self.search) {
            conditions.push(Predicate::Or(vec![
                Predicate::Contains {
                    column: TextColumn::Title,
                    value: term.to_string(),
                },
                Predicate::Contains {
                    column: TextColumn::Author,
                    value: term.to_string(),
                },
            ]));
        }

        if let Some(genre) = non_blank(&self.genre) {
            conditions.push(Predicate::Equals {
                column: TextColumn::Genre,
                value: genre.to_string(),
            });
        }

        if let Some(author) = non_blank(&self.author) {
            conditions.push(Predicate::Contains {
                column: TextColumn::Author,
                value: author.to_string(),
            });
        }

        let bounds = [
            ("year_min", &self.year_min, IntColumn::Year, true),
            ("year_max", &self.year_max, IntColumn::Year, false),
            ("rating_min", &self.rating_min, IntColumn::Rating, true),
        ];
        for (name, raw, column, lower) in bounds {
            match parse_int_param(name, raw) {
                Ok(Some(value)) if lower => conditions.push(Predicate::AtLeast { column, value }),
                Ok(Some(value)) => conditions.push(Predicate::AtMost { column, value }),
                Ok(None) => {}
                Err(msg) => errors.push(msg),
            }
        }

        if !errors.is_empty() {
            return Err(CoreError::Validation(errors));
        }

        let predicate = match conditions.len() {
            0 => Predicate::All,
            1 => conditions.remove(0),
            _ => Predicate::And(conditions),
        };

        let sort = SortSpec {
            column: non_blank(&self.sort_by)
                .and_then(SortColumn::parse)
                .unwrap_or_default(),
            direction: non_blank(&self.sort_order)
                .and_then(SortDirection::parse)
                .unwrap_or_default(),
        };

        Ok(BookQuery { predicate, sort })
    }
}
