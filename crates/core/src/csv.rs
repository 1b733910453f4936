//! CSV reading and writing for bulk import/export.
//!
//! Export always writes the fixed header `title,author,isbn,publisher,year,
//! genre,rating`, even when there are no rows. Import reads any header
//! layout, matching known column names case-insensitively and ignoring the
//! rest.

use serde::Serialize;

use crate::book::{BookFields, NewBook, BOOK_FIELDS};
use crate::error::CoreError;

/// Data rows are numbered from 2; row 1 is the header.
pub const FIRST_DATA_ROW: usize = 2;

/// One data row of an uploaded CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based row number, counting the header as row 1.
    pub row: usize,
    pub fields: BookFields,
}

/// A row the CSV reader could not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    pub row: usize,
    pub reason: String,
}

/// A book as written to (and read back from) an export file.
///
/// Absent values serialize as empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub rating: Option<i32>,
}

impl From<&NewBook> for CsvBook {
    fn from(book: &NewBook) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            publisher: book.publisher.clone(),
            year: book.year,
            genre: book.genre.clone(),
            rating: book.rating,
        }
    }
}

/// Serialize books to CSV text with the fixed export header.
pub fn write_books<I>(books: I) -> Result<String, CoreError>
where
    I: IntoIterator<Item = CsvBook>,
{
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(BOOK_FIELDS).map_err(csv_internal)?;
    for book in books {
        writer.serialize(&book).map_err(csv_internal)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Internal(format!("CSV is not UTF-8: {e}")))
}

fn csv_internal(err: ::csv::Error) -> CoreError {
    CoreError::Internal(format!("CSV write failed: {err}"))
}

/// Parse uploaded CSV text into per-row field maps.
///
/// A missing or unreadable header is an error for the whole file. Problems
/// with individual data rows are returned in place as [`MalformedRow`] so the
/// caller can report them without abandoning the batch.
pub fn read_rows(text: &str) -> Result<Vec<Result<CsvRow, MalformedRow>>, CoreError> {
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CoreError::validation(format!("Unreadable CSV header: {e}")))?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(CoreError::validation("CSV file has no header row"));
    }

    let rows = reader
        .records()
        .enumerate()
        .map(|(index, result)| -> Result<CsvRow, MalformedRow> {
            let row = index + FIRST_DATA_ROW;
            let record = result.map_err(|e| MalformedRow {
                row,
                reason: e.to_string(),
            })?;

            let fields = headers
                .iter()
                .zip(record.iter())
                .filter(|(name, _)| BOOK_FIELDS.contains(&name.as_str()))
                .map(|(name, value)| (name.as_str(), value))
                .collect();

            Ok(CsvRow { row, fields })
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const HEADER: &str = "title,author,isbn,publisher,year,genre,rating";

    fn book(title: &str) -> CsvBook {
        CsvBook {
            title: title.to_string(),
            author: "Someone".to_string(),
            isbn: None,
            publisher: None,
            year: None,
            genre: None,
            rating: None,
        }
    }

    // -- write_books ---------------------------------------------------------

    #[test]
    fn empty_export_still_has_header() {
        let csv = write_books(Vec::new()).unwrap();
        assert_eq!(csv.trim_end(), HEADER);
    }

    #[test]
    fn absent_values_are_empty_cells() {
        let csv = write_books(vec![book("Dune")]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(lines.next(), Some("Dune,Someone,,,,,"));
        assert!(!csv.contains("null"));
        assert!(!csv.contains("None"));
    }

    #[test]
    fn values_with_commas_and_quotes_are_quoted() {
        let mut b = book("Hello, \"World\"");
        b.year = Some(2001);
        b.rating = Some(4);
        let csv = write_books(vec![b]).unwrap();
        assert_eq!(
            csv.lines().nth(1),
            Some("\"Hello, \"\"World\"\"\",Someone,,,2001,,4")
        );
    }

    // -- read_rows -----------------------------------------------------------

    #[test]
    fn rows_are_numbered_from_two() {
        let text = format!("{HEADER}\nA,B,,,,,\nC,D,,,,,\n");
        let rows = read_rows(&text).unwrap();
        let numbers: Vec<usize> = rows.iter().map(|r| r.as_ref().unwrap().row).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn headers_are_matched_case_insensitively_and_unknown_columns_ignored() {
        let text = "\u{feff} Title ,AUTHOR,notes\nDune,Frank Herbert,great\n";
        let rows = read_rows(text).unwrap();
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.fields.value("title"), Some("Dune"));
        assert_eq!(row.fields.value("author"), Some("Frank Herbert"));
        assert_eq!(row.fields.raw("notes"), None);
    }

    #[test]
    fn short_rows_leave_fields_absent() {
        let rows = read_rows("title,author,isbn\nDune\n").unwrap();
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.fields.value("title"), Some("Dune"));
        assert_eq!(row.fields.raw("author"), None);
    }

    #[test]
    fn empty_file_is_rejected() {
        assert_matches!(read_rows(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn header_only_file_has_no_rows() {
        assert!(read_rows(HEADER).unwrap().is_empty());
    }

    #[test]
    fn export_then_import_preserves_values() {
        let original = NewBook {
            title: "Hello, \"World\"".into(),
            author: "Ada Lovelace".into(),
            isbn: Some("9780306406157".into()),
            publisher: Some("Penguin".into()),
            year: Some(1843),
            genre: None,
            rating: Some(5),
        };
        let csv = write_books(vec![CsvBook::from(&original)]).unwrap();

        let rows = read_rows(&csv).unwrap();
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_ref().unwrap();
        let reimported = NewBook::from_fields(&row.fields).unwrap();
        assert_eq!(reimported, original);
    }
}
