//! Batch import of CSV rows.
//!
//! Each row is checked, de-duplicated, and inserted on its own. A bad row is
//! recorded in the [`ImportReport`] and skipped; it never aborts the batch,
//! and rows already inserted stay inserted.

use async_trait::async_trait;
use serde::Serialize;

use crate::book::{DuplicateBook, NewBook, FIELD_ISBN};
use crate::csv::{CsvRow, MalformedRow};
use crate::types::DbId;

/// Storage operations the importer needs.
///
/// Implemented over a pooled database connection in `bookbase-db`; tests use
/// an in-memory implementation.
#[async_trait]
pub trait BookStore: Send {
    type Error: std::fmt::Display + Send;

    /// Look up the record that already owns a normalized ISBN, if any.
    async fn find_duplicate(&mut self, isbn: &str) -> Result<Option<DuplicateBook>, Self::Error>;

    /// Insert a record and return its new id.
    async fn insert(&mut self, book: &NewBook) -> Result<DbId, Self::Error>;
}

/// Outcome of one CSV import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported_count: usize,
    /// Titles of inserted rows, in insertion order.
    pub imported_titles: Vec<String>,
    /// Missing-field, validation, malformed-row, and database messages.
    pub errors: Vec<String>,
    /// Rows skipped because their ISBN is already catalogued.
    pub duplicates: Vec<String>,
}

impl ImportReport {
    fn imported(&mut self, title: String) {
        self.imported_count += 1;
        self.imported_titles.push(title);
    }
}

/// Import rows strictly in order against `store`.
pub async fn import_rows<S, I>(store: &mut S, rows: I) -> ImportReport
where
    S: BookStore + ?Sized,
    I: IntoIterator<Item = Result<CsvRow, MalformedRow>>,
{
    let mut report = ImportReport::default();

    for parsed in rows {
        let CsvRow { row, fields } = match parsed {
            Ok(csv_row) => csv_row,
            Err(MalformedRow { row, reason }) => {
                report
                    .errors
                    .push(format!("Row {row}: Malformed CSV row - {reason}"));
                continue;
            }
        };

        let missing = fields.missing_required();
        if !missing.is_empty() {
            report.errors.push(format!(
                "Row {row}: Missing required fields: {}",
                missing.join(", ")
            ));
            continue;
        }

        let book = match NewBook::from_fields(&fields) {
            Ok(book) => book,
            Err(errors) => {
                report.errors.push(format!("Row {row}: {}", errors.join(", ")));
                continue;
            }
        };

        if let Some(isbn) = &book.isbn {
            match store.find_duplicate(isbn).await {
                Ok(Some(existing)) => {
                    let supplied = fields.value(FIELD_ISBN).unwrap_or(isbn.as_str());
                    report.duplicates.push(format!(
                        "Row {row}: ISBN {supplied} already exists for '{}'",
                        existing.title
                    ));
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    report
                        .errors
                        .push(format!("Row {row}: Database error - {e}"));
                    continue;
                }
            }
        }

        match store.insert(&book).await {
            Ok(_) => report.imported(book.title),
            Err(e) => report
                .errors
                .push(format!("Row {row}: Database error - {e}")),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookFields;
    use crate::csv::{read_rows, write_books, CsvBook, FIRST_DATA_ROW};

    /// In-memory store; inserts of `reject_title` fail like a constraint
    /// violation would.
    #[derive(Default)]
    struct MemoryStore {
        books: Vec<(DbId, NewBook)>,
        reject_title: Option<String>,
    }

    #[async_trait]
    impl BookStore for MemoryStore {
        type Error = String;

        async fn find_duplicate(&mut self, isbn: &str) -> Result<Option<DuplicateBook>, String> {
            Ok(self
                .books
                .iter()
                .find(|(_, b)| b.isbn.as_deref() == Some(isbn))
                .map(|(id, b)| DuplicateBook {
                    id: *id,
                    title: b.title.clone(),
                    author: b.author.clone(),
                }))
        }

        async fn insert(&mut self, book: &NewBook) -> Result<DbId, String> {
            if self.reject_title.as_deref() == Some(book.title.as_str()) {
                return Err("duplicate key value violates unique constraint".to_string());
            }
            let id = self.books.len() as DbId + 1;
            self.books.push((id, book.clone()));
            Ok(id)
        }
    }

    fn rows(records: &[&[(&str, &str)]]) -> Vec<Result<CsvRow, MalformedRow>> {
        records
            .iter()
            .enumerate()
            .map(|(i, pairs)| {
                Ok(CsvRow {
                    row: i + FIRST_DATA_ROW,
                    fields: pairs.iter().copied().collect::<BookFields>(),
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn mixed_batch_reports_each_outcome_by_row() {
        let mut store = MemoryStore::default();
        let batch = rows(&[
            &[("title", "A"), ("author", "B"), ("isbn", "0123456789")],
            &[("title", ""), ("author", "C")],
            &[("title", "D"), ("author", "E"), ("isbn", "0123456789")],
        ]);

        let report = import_rows(&mut store, batch).await;

        assert_eq!(report.imported_count, 1);
        assert_eq!(report.imported_titles, vec!["A"]);
        assert_eq!(report.errors, vec!["Row 3: Missing required fields: title"]);
        assert_eq!(
            report.duplicates,
            vec!["Row 4: ISBN 0123456789 already exists for 'A'"]
        );
        assert_eq!(store.books.len(), 1);
    }

    #[tokio::test]
    async fn validation_errors_are_joined_per_row() {
        let mut store = MemoryStore::default();
        let batch = rows(&[&[
            ("title", "A"),
            ("author", "B"),
            ("year", "999"),
            ("rating", "6"),
        ]]);

        let report = import_rows(&mut store, batch).await;

        assert_eq!(report.imported_count, 0);
        assert_eq!(
            report.errors,
            vec!["Row 2: Invalid publication year, Rating must be between 1 and 5 stars"]
        );
    }

    #[tokio::test]
    async fn hyphenated_isbn_is_a_duplicate_of_plain_isbn() {
        let mut store = MemoryStore::default();
        let batch = rows(&[
            &[("title", "A"), ("author", "B"), ("isbn", "0123456789")],
            &[("title", "C"), ("author", "D"), ("isbn", "0-12-345678-9")],
        ]);

        let report = import_rows(&mut store, batch).await;

        assert_eq!(report.imported_titles, vec!["A"]);
        assert_eq!(
            report.duplicates,
            vec!["Row 3: ISBN 0-12-345678-9 already exists for 'A'"]
        );
    }

    #[tokio::test]
    async fn store_failure_does_not_abort_the_batch() {
        let mut store = MemoryStore {
            reject_title: Some("Broken".to_string()),
            ..Default::default()
        };
        let batch = rows(&[
            &[("title", "First"), ("author", "X")],
            &[("title", "Broken"), ("author", "Y")],
            &[("title", "Last"), ("author", "Z")],
        ]);

        let report = import_rows(&mut store, batch).await;

        assert_eq!(report.imported_titles, vec!["First", "Last"]);
        assert_eq!(
            report.errors,
            vec!["Row 3: Database error - duplicate key value violates unique constraint"]
        );
    }

    #[tokio::test]
    async fn malformed_rows_are_reported_and_skipped() {
        let mut store = MemoryStore::default();
        let batch = vec![
            Err(MalformedRow {
                row: 2,
                reason: "invalid UTF-8".to_string(),
            }),
            Ok(CsvRow {
                row: 3,
                fields: [("title", "Ok"), ("author", "Fine")].into_iter().collect(),
            }),
        ];

        let report = import_rows(&mut store, batch).await;

        assert_eq!(report.imported_titles, vec!["Ok"]);
        assert_eq!(report.errors, vec!["Row 2: Malformed CSV row - invalid UTF-8"]);
    }

    #[tokio::test]
    async fn exported_books_reimport_with_identical_values() {
        let mut source = MemoryStore::default();
        let originals = rows(&[
            &[
                ("title", "Dune"),
                ("author", "Frank Herbert"),
                ("isbn", "9780441013593"),
                ("publisher", "Ace"),
                ("year", "1965"),
                ("genre", "Science Fiction"),
                ("rating", "5"),
            ],
            &[("title", "Untitled, \"draft\""), ("author", "Anon")],
        ]);
        import_rows(&mut source, originals).await;

        let csv = write_books(source.books.iter().map(|(_, b)| CsvBook::from(b))).unwrap();

        let mut target = MemoryStore::default();
        let report = import_rows(&mut target, read_rows(&csv).unwrap()).await;

        assert_eq!(report.imported_count, 2);
        let before: Vec<&NewBook> = source.books.iter().map(|(_, b)| b).collect();
        let after: Vec<&NewBook> = target.books.iter().map(|(_, b)| b).collect();
        assert_eq!(before, after);
    }
}
